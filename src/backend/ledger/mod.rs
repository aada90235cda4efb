//! Conversation Ledger
//!
//! Durable append-only store of messages, each tied to a group and sender,
//! plus the group records themselves. The ledger exclusively owns both.
//!
//! Duo groups are canonical: at most one exists per unordered user pair,
//! enforced through a `(min, max)` pair index mutated under the same write
//! guard that creates the group, so no check-then-create window exists.
//!
//! When a PostgreSQL pool is configured, groups and messages are persisted
//! write-through and restored at startup. The write guard is held across
//! the store insert so memory and store cannot disagree about order.

pub mod db;

use std::collections::HashMap;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::error::BackendError;
use crate::shared::chat::{Group, GroupKind, Message};
use crate::shared::{GroupId, MessageId, UserId};

/// Canonical key for an unordered user pair.
fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    groups: HashMap<GroupId, Group>,
    duo_index: HashMap<(UserId, UserId), GroupId>,
    messages: HashMap<GroupId, Vec<Message>>,
}

/// Append-only message store scoped to groups.
#[derive(Debug)]
pub struct ConversationLedger {
    inner: RwLock<LedgerState>,
    pool: Option<PgPool>,
}

impl ConversationLedger {
    /// Create a ledger. With `None` the ledger is memory-only; with a pool
    /// every group and message is persisted write-through.
    pub fn new(pool: Option<PgPool>) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            pool,
        }
    }

    /// Reload groups and messages from the store. Called once at startup,
    /// before any connection is accepted.
    pub async fn restore(&self) -> Result<(usize, usize), BackendError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return Ok((0, 0)),
        };

        let groups = db::load_groups(pool).await?;
        let messages = db::load_messages(pool).await?;

        let mut state = self.inner.write().await;
        for group in groups {
            if group.kind == GroupKind::Duo {
                let mut members = group.members.iter().copied();
                if let (Some(a), Some(b)) = (members.next(), members.next()) {
                    state.duo_index.insert(pair_key(a, b), group.id);
                }
            }
            state.groups.insert(group.id, group);
        }
        // Messages arrive in created_at order, so pushing preserves the
        // per-group ledger order.
        for message in messages {
            state.messages.entry(message.group_id).or_default().push(message);
        }

        Ok((state.groups.len(), state.messages.values().map(Vec::len).sum()))
    }

    /// Ensure exactly one Duo group exists for the pair `{a, b}`, creating
    /// it if absent. Idempotent: an existing group is returned unchanged.
    pub async fn ensure_duo(&self, a: UserId, b: UserId) -> Result<Group, BackendError> {
        if a == b {
            return Err(BackendError::validation(
                "members",
                "a Duo group needs two distinct users",
            ));
        }

        let mut state = self.inner.write().await;

        if let Some(id) = state.duo_index.get(&pair_key(a, b)) {
            let group = state.groups[id].clone();
            tracing::debug!("[Ledger] Duo group {} already exists for pair", group.id);
            return Ok(group);
        }

        let group = Group::new(GroupKind::Duo, [a, b].into_iter().collect());
        if let Some(pool) = &self.pool {
            db::insert_group(pool, &group).await?;
        }
        state.duo_index.insert(pair_key(a, b), group.id);
        state.groups.insert(group.id, group.clone());

        tracing::info!("[Ledger] created Duo group {} for pair", group.id);
        Ok(group)
    }

    /// Create a group. A two-member Duo request routes through
    /// [`ensure_duo`](Self::ensure_duo) so canonicality holds no matter
    /// which entry point created the group.
    pub async fn create_group(
        &self,
        kind: GroupKind,
        members: impl IntoIterator<Item = UserId>,
    ) -> Result<Group, BackendError> {
        let members: std::collections::HashSet<UserId> = members.into_iter().collect();
        if members.len() < 2 {
            return Err(BackendError::validation(
                "members",
                "a group needs at least two members",
            ));
        }

        if kind == GroupKind::Duo {
            let mut iter = members.iter().copied();
            return match (iter.next(), iter.next(), iter.next()) {
                (Some(a), Some(b), None) => self.ensure_duo(a, b).await,
                _ => Err(BackendError::validation(
                    "members",
                    "a Duo group has exactly two members",
                )),
            };
        }

        let group = Group::new(kind, members);
        let mut state = self.inner.write().await;
        if let Some(pool) = &self.pool {
            db::insert_group(pool, &group).await?;
        }
        state.groups.insert(group.id, group.clone());

        tracing::info!("[Ledger] created {} group {}", group.kind.as_str(), group.id);
        Ok(group)
    }

    /// Durably append a message to a group's ledger.
    ///
    /// Fails with `NotFound` when the group does not exist and with
    /// `Validation` when the sender is not a member or the body is blank.
    pub async fn append(
        &self,
        group_id: GroupId,
        sender_id: UserId,
        body: &str,
    ) -> Result<Message, BackendError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(BackendError::validation("body", "message body is empty"));
        }

        let mut state = self.inner.write().await;

        let group = state
            .groups
            .get(&group_id)
            .ok_or_else(|| BackendError::not_found("group", group_id))?;
        if !group.has_member(sender_id) {
            return Err(BackendError::validation(
                "senderId",
                format!("user {sender_id} is not a member of group {group_id}"),
            ));
        }

        let message = Message::new(group_id, sender_id, body);
        if let Some(pool) = &self.pool {
            db::insert_message(pool, &message).await?;
        }
        state.messages.entry(group_id).or_default().push(message.clone());

        Ok(message)
    }

    /// The group's messages, ascending by creation time. Pure read.
    pub async fn messages_for_group(&self, group_id: GroupId) -> Result<Vec<Message>, BackendError> {
        let state = self.inner.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(BackendError::not_found("group", group_id));
        }
        Ok(state.messages.get(&group_id).cloned().unwrap_or_default())
    }

    /// Look up one group.
    pub async fn group(&self, group_id: GroupId) -> Result<Group, BackendError> {
        let state = self.inner.read().await;
        state
            .groups
            .get(&group_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found("group", group_id))
    }

    /// All groups the user is a member of.
    pub async fn groups_for_user(&self, user_id: UserId) -> Vec<Group> {
        let state = self.inner.read().await;
        let mut groups: Vec<Group> = state
            .groups
            .values()
            .filter(|g| g.has_member(user_id))
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.created_at);
        groups
    }

    /// Mark a message as seen, the one mutation messages permit.
    pub async fn mark_seen(
        &self,
        group_id: GroupId,
        message_id: MessageId,
    ) -> Result<Message, BackendError> {
        let mut state = self.inner.write().await;

        let messages = state
            .messages
            .get_mut(&group_id)
            .ok_or_else(|| BackendError::not_found("group", group_id))?;
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| BackendError::not_found("message", message_id))?;

        message.seen = true;
        let message = message.clone();
        if let Some(pool) = &self.pool {
            db::mark_message_seen(pool, message_id).await?;
        }

        Ok(message)
    }
}
