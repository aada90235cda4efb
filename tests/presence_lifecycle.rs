//! Presence registry lifecycle: bind/unbind transitions, unknown-connection
//! no-ops, and last-seen bookkeeping.

use std::collections::HashSet;

use ripple::backend::presence::PresenceRegistry;
use uuid::Uuid;

#[tokio::test]
async fn bind_marks_online_and_unbind_marks_offline() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();
    let conn = Uuid::new_v4();

    assert!(!registry.is_online(user).await);

    registry.bind(conn, user).await;
    assert!(registry.is_online(user).await);
    assert_eq!(registry.connection_for(user).await, Some(conn));

    registry.unbind(conn).await;
    assert!(!registry.is_online(user).await);
    assert_eq!(registry.connection_for(user).await, None);
}

#[tokio::test]
async fn unbind_unknown_connection_does_not_disturb_anyone() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();
    registry.bind(Uuid::new_v4(), user).await;

    // a connection that closed before ever binding
    assert_eq!(registry.unbind(Uuid::new_v4()).await, None);
    assert!(registry.is_online(user).await);
}

#[tokio::test]
async fn last_seen_advances_across_the_lifecycle() {
    let registry = PresenceRegistry::new();
    let user = Uuid::new_v4();
    let conn = Uuid::new_v4();

    registry.ensure(user).await;
    let created = registry.record(user).await.unwrap();

    registry.bind(conn, user).await;
    let online = registry.record(user).await.unwrap();
    assert!(online.last_seen >= created.last_seen);

    registry.unbind(conn).await;
    let offline = registry.record(user).await.unwrap();
    assert!(offline.last_seen >= online.last_seen);

    // the record survives disconnect; history is retained
    assert!(!offline.online);
    assert_eq!(offline.user_id, user);
}

#[tokio::test]
async fn snapshot_reflects_current_state_without_side_effects() {
    let registry = PresenceRegistry::new();
    let online_user = Uuid::new_v4();
    let offline_user = Uuid::new_v4();

    registry.bind(Uuid::new_v4(), online_user).await;
    registry.ensure(offline_user).await;

    let ids = HashSet::from([online_user, offline_user]);
    let records = registry.snapshot(&ids).await;
    assert_eq!(records.len(), 2);

    let online_count = records.iter().filter(|r| r.online).count();
    assert_eq!(online_count, 1);

    // reading twice yields the same answer
    assert_eq!(registry.snapshot(&ids).await.len(), 2);
}
