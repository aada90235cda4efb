//! Conversation Data Structures
//!
//! Groups (conversation containers) and the messages appended to them, plus
//! the online-peers payload produced by the visibility compiler.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GroupId, MessageId, UserId};

/// Kind of a conversation container.
///
/// A `Duo` group between two users is canonical: at most one may exist for
/// a given unordered pair at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupKind {
    Duo,
    Multiple,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duo => "Duo",
            Self::Multiple => "Multiple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Duo" => Some(Self::Duo),
            "Multiple" => Some(Self::Multiple),
            _ => None,
        }
    }
}

/// A conversation container with a fixed member set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Unique group ID
    pub id: GroupId,
    /// Duo or Multiple
    pub kind: GroupKind,
    /// Member user IDs
    pub members: HashSet<UserId>,
    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group. Duo canonicality is enforced by the ledger, not
    /// here; use `ConversationLedger::ensure_duo` for two-member groups.
    pub fn new(kind: GroupKind, members: HashSet<UserId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            members,
            created_at: Utc::now(),
        }
    }

    /// Check whether a user belongs to this group.
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

/// One message in a group's ledger. Immutable once created except for the
/// `seen` flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Group this message belongs to
    pub group_id: GroupId,
    /// User who sent the message
    pub sender_id: UserId,
    /// Message text
    pub body: String,
    /// Whether the recipient has seen the message
    pub seen: bool,
    /// When the message was appended
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(group_id: GroupId, sender_id: UserId, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            sender_id,
            body: body.into(),
            seen: false,
            created_at: Utc::now(),
        }
    }
}

/// Response payload for a "collect online peers" query: the online subset
/// of the user's network plus all four derived follow sets.
///
/// Id lists are sorted so responses are deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePeers {
    /// Members of the user's network currently online
    pub online_user_ids: Vec<UserId>,
    /// Users who follow the user but are not followed back
    pub one_way_in: Vec<UserId>,
    /// Users the user follows who do not follow back
    pub one_way_out: Vec<UserId>,
    /// Union of following and followers
    pub unique_ids: Vec<UserId>,
    /// Mutual follows
    pub mutual_ids: Vec<UserId>,
}
