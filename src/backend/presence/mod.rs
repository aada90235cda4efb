//! Presence Registry
//!
//! Tracks which users are currently reachable over an open connection and
//! maps a user identity to its live connection. The registry is keyed both
//! ways: records by user id, and a reverse index from connection id to user
//! id, because disconnect events arrive with only a connection identifier.
//!
//! State machine per user: `Offline` (initial) -> `Online` on bind (records
//! the connection id and refreshes `last_seen`) -> `Offline` on unbind
//! (clears the connection id, refreshes `last_seen`). Records are never
//! deleted; `last_seen` history is retained.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::shared::{ConnectionId, PresenceRecord, UserId};

#[derive(Debug, Default)]
struct PresenceState {
    records: HashMap<UserId, PresenceRecord>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// Keyed registry of per-user presence state.
///
/// Mutations are applied under a single write guard, so a bind can never
/// interleave with an unbind for the same user.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: RwLock<PresenceState>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an offline record for a user if none exists yet. Called at
    /// account creation; binding also creates records lazily, so this is
    /// not required before `bind`.
    pub async fn ensure(&self, user_id: UserId) {
        let mut state = self.inner.write().await;
        state
            .records
            .entry(user_id)
            .or_insert_with(|| PresenceRecord::offline(user_id));
    }

    /// Transition a user to Online on the given connection.
    ///
    /// If the user is already online on another connection the stale
    /// reverse-index entry is dropped, so unbinding the old connection
    /// later is a no-op.
    pub async fn bind(&self, connection_id: ConnectionId, user_id: UserId) -> PresenceRecord {
        let mut state = self.inner.write().await;

        let record = state
            .records
            .entry(user_id)
            .or_insert_with(|| PresenceRecord::offline(user_id));

        let stale = record.connection_id.take();
        record.online = true;
        record.last_seen = Utc::now();
        record.connection_id = Some(connection_id);
        let record = record.clone();

        if let Some(old) = stale {
            state.by_connection.remove(&old);
        }
        state.by_connection.insert(connection_id, user_id);

        tracing::info!("[Presence] {} online on connection {}", user_id, connection_id);
        record
    }

    /// Transition the user bound to `connection_id` to Offline.
    ///
    /// Total operation: an unknown connection id (closed before it ever
    /// bound, or already replaced by a rebind) is a silent no-op and does
    /// not alter any other user's presence.
    pub async fn unbind(&self, connection_id: ConnectionId) -> Option<UserId> {
        let mut state = self.inner.write().await;

        let user_id = state.by_connection.remove(&connection_id)?;
        if let Some(record) = state.records.get_mut(&user_id) {
            record.online = false;
            record.last_seen = Utc::now();
            record.connection_id = None;
        }

        tracing::info!("[Presence] {} offline (connection {})", user_id, connection_id);
        Some(user_id)
    }

    /// Whether the user currently has a live connection.
    pub async fn is_online(&self, user_id: UserId) -> bool {
        let state = self.inner.read().await;
        state.records.get(&user_id).is_some_and(|r| r.online)
    }

    /// The user's live connection, if any.
    pub async fn connection_for(&self, user_id: UserId) -> Option<ConnectionId> {
        let state = self.inner.read().await;
        state.records.get(&user_id).and_then(|r| r.connection_id)
    }

    /// Snapshot the presence records for a set of users. Users without a
    /// record are omitted (never connected, never ensured).
    pub async fn snapshot(&self, user_ids: &HashSet<UserId>) -> Vec<PresenceRecord> {
        let state = self.inner.read().await;
        user_ids
            .iter()
            .filter_map(|id| state.records.get(id).cloned())
            .collect()
    }

    /// Snapshot one user's record.
    pub async fn record(&self, user_id: UserId) -> Option<PresenceRecord> {
        let state = self.inner.read().await;
        state.records.get(&user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_bind_then_unbind() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let conn = Uuid::new_v4();

        let record = registry.bind(conn, user).await;
        assert!(record.online);
        assert_eq!(record.connection_id, Some(conn));
        assert!(registry.is_online(user).await);

        assert_eq!(registry.unbind(conn).await, Some(user));
        assert!(!registry.is_online(user).await);

        let record = registry.record(user).await.unwrap();
        assert_eq!(record.connection_id, None);
    }

    #[tokio::test]
    async fn test_unbind_unknown_connection_is_noop() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let conn = Uuid::new_v4();
        registry.bind(conn, user).await;

        assert_eq!(registry.unbind(Uuid::new_v4()).await, None);
        assert!(registry.is_online(user).await);
    }

    #[tokio::test]
    async fn test_rebind_drops_stale_connection() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();

        registry.bind(old, user).await;
        registry.bind(new, user).await;

        // Unbinding the replaced connection must not knock the user offline.
        assert_eq!(registry.unbind(old).await, None);
        assert!(registry.is_online(user).await);
        assert_eq!(registry.connection_for(user).await, Some(new));

        assert_eq!(registry.unbind(new).await, Some(user));
        assert!(!registry.is_online(user).await);
    }

    #[tokio::test]
    async fn test_ensure_creates_offline_record() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();

        registry.ensure(user).await;
        let record = registry.record(user).await.unwrap();
        assert!(!record.online);

        // ensure after bind must not reset state
        let conn = Uuid::new_v4();
        registry.bind(conn, user).await;
        registry.ensure(user).await;
        assert!(registry.is_online(user).await);
    }

    #[tokio::test]
    async fn test_snapshot_skips_unknown_users() {
        let registry = PresenceRegistry::new();
        let known = Uuid::new_v4();
        registry.bind(Uuid::new_v4(), known).await;

        let ids = HashSet::from([known, Uuid::new_v4()]);
        let records = registry.snapshot(&ids).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, known);
    }
}
