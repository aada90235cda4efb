//! End-to-end session flows over the typed event channel: handshake
//! binding, online-peers collection, message send/ack/receive, and cleanup
//! on both clean and abrupt disconnects.

use std::sync::Arc;

use ripple::backend::delivery::{ConnectionRegistry, MessageRouter};
use ripple::backend::graph::SocialGraph;
use ripple::backend::ledger::ConversationLedger;
use ripple::backend::presence::PresenceRegistry;
use ripple::backend::session::{Session, SessionServices};
use ripple::backend::visibility::VisibilityCompiler;
use ripple::shared::{ClientEvent, ServerEvent, UserId};
use tokio::sync::mpsc;
use uuid::Uuid;

struct World {
    services: SessionServices,
    graph: Arc<SocialGraph>,
    ledger: Arc<ConversationLedger>,
}

fn world() -> World {
    let ledger = Arc::new(ConversationLedger::new(None));
    let graph = Arc::new(SocialGraph::new(ledger.clone()));
    let presence = Arc::new(PresenceRegistry::new());
    let connections = Arc::new(ConnectionRegistry::new());
    let services = SessionServices {
        presence: presence.clone(),
        visibility: Arc::new(VisibilityCompiler::new(graph.clone(), presence.clone())),
        router: Arc::new(MessageRouter::new(
            ledger.clone(),
            presence,
            connections.clone(),
        )),
        connections,
    };
    World {
        services,
        graph,
        ledger,
    }
}

async fn register_user(world: &World) -> UserId {
    let id = Uuid::new_v4();
    world.graph.create_profile(id).await;
    world.services.presence.ensure(id).await;
    id
}

#[tokio::test]
async fn full_chat_round_trip() {
    let world = world();
    let a = register_user(&world).await;
    let b = register_user(&world).await;

    // mutual follow creates the Duo group
    world.graph.follow(a, b).await.unwrap();
    world.graph.follow(b, a).await.unwrap();
    let group = world.ledger.groups_for_user(a).await[0].clone();

    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let mut session_b = Session::open(world.services.clone(), Some(b), tx_b).await;

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let mut session_a = Session::open(world.services.clone(), Some(a), tx_a).await;

    // a sees b online among mutuals
    session_a
        .handle(ClientEvent::CollectOnlinePeers { user_id: a })
        .await;
    match rx_a.recv().await.unwrap() {
        ServerEvent::OnlinePeers(peers) => {
            assert_eq!(peers.online_user_ids, vec![b]);
            assert_eq!(peers.mutual_ids, vec![b]);
        }
        other => panic!("expected online-peers, got {other:?}"),
    }

    // a sends, gets the ack; b receives the identical message
    session_a
        .handle(ClientEvent::SendMessage {
            message: "hey".into(),
            sender_id: a,
            group_id: group.id,
            receiver_id: b,
        })
        .await;
    let ack = match rx_a.recv().await.unwrap() {
        ServerEvent::MessageAck(message) => message,
        other => panic!("expected message-ack, got {other:?}"),
    };
    match rx_b.recv().await.unwrap() {
        ServerEvent::ReceiveMessage(message) => assert_eq!(message, ack),
        other => panic!("expected receive-message, got {other:?}"),
    }

    // clean disconnect on both sides
    session_b.handle(ClientEvent::Disconnect).await;
    assert!(!world.services.presence.is_online(b).await);

    session_a.close().await;
    assert!(!world.services.presence.is_online(a).await);
    assert!(world.services.connections.is_empty());
}

#[tokio::test]
async fn message_to_disconnected_peer_waits_in_the_ledger() {
    let world = world();
    let a = register_user(&world).await;
    let b = register_user(&world).await;
    world.graph.follow(a, b).await.unwrap();
    let group = world.ledger.groups_for_user(a).await[0].clone();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let mut session_a = Session::open(world.services.clone(), Some(a), tx_a).await;

    session_a
        .handle(ClientEvent::SendMessage {
            message: "you there?".into(),
            sender_id: a,
            group_id: group.id,
            receiver_id: b,
        })
        .await;

    // sender still gets the synchronous ack
    assert!(matches!(
        rx_a.recv().await.unwrap(),
        ServerEvent::MessageAck(..)
    ));

    // the message is retrievable on b's next read
    let stored = world.ledger.messages_for_group(group.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].body, "you there?");
}

#[tokio::test]
async fn abrupt_drop_unbinds_presence_without_handshake() {
    let world = world();
    let a = register_user(&world).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = Session::open(world.services.clone(), Some(a), tx).await;
    assert!(world.services.presence.is_online(a).await);

    // the adapter calls close() when the socket drops, with no disconnect
    // event ever arriving
    session.close().await;
    assert!(!world.services.presence.is_online(a).await);
}

#[tokio::test]
async fn anonymous_connection_binds_late_and_cleans_up() {
    let world = world();
    let a = register_user(&world).await;

    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = Session::open(world.services.clone(), None, tx).await;
    assert!(!world.services.presence.is_online(a).await);

    session
        .handle(ClientEvent::Connect { user_id: Some(a) })
        .await;
    assert!(world.services.presence.is_online(a).await);

    session.handle(ClientEvent::Disconnect).await;
    assert!(!world.services.presence.is_online(a).await);
}
