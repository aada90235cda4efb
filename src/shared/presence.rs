//! Presence Record
//!
//! Per-user online/offline state plus the live connection identifier.
//! Records are created lazily on first bind (or eagerly at account
//! creation) and never deleted, so `last_seen` history is retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConnectionId, UserId};

/// One user's presence state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// User this record belongs to
    pub user_id: UserId,
    /// Whether the user currently has a live connection
    pub online: bool,
    /// Refreshed on every connect and disconnect
    pub last_seen: DateTime<Utc>,
    /// The live connection, present only while online
    pub connection_id: Option<ConnectionId>,
}

impl PresenceRecord {
    /// Create a fresh offline record.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            online: false,
            last_seen: Utc::now(),
            connection_id: None,
        }
    }
}
