//! Connection Registry & Message Router
//!
//! The registry is a keyed map from connection id to that connection's
//! outbound event channel. The router orchestrates
//! "persist, then attempt live delivery" per message: the ledger append
//! always happens first, and a delivery miss is expected, not an error;
//! the message is already durable and will be picked up on the next read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::backend::error::BackendError;
use crate::backend::ledger::ConversationLedger;
use crate::backend::presence::PresenceRegistry;
use crate::shared::chat::Message;
use crate::shared::{ConnectionId, GroupId, ServerEvent, UserId};

/// Outbound channel of one live connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Keyed registry of live connections' outbound channels.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    channels: Mutex<HashMap<ConnectionId, OutboundSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound channel.
    pub fn register(&self, connection_id: ConnectionId, sender: OutboundSender) {
        self.channels.lock().unwrap().insert(connection_id, sender);
    }

    /// Drop a connection's channel. No-op for unknown ids.
    pub fn unregister(&self, connection_id: ConnectionId) {
        self.channels.lock().unwrap().remove(&connection_id);
    }

    /// Push an event to one connection. Returns `false` when the
    /// connection is unknown or its channel has closed.
    pub fn push(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        match self.channels.lock().unwrap().get(&connection_id) {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Number of registered connections (for logging and tests).
    pub fn len(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Routes one message: durable append, then best-effort live delivery.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    ledger: Arc<ConversationLedger>,
    presence: Arc<PresenceRegistry>,
    connections: Arc<ConnectionRegistry>,
}

impl MessageRouter {
    pub fn new(
        ledger: Arc<ConversationLedger>,
        presence: Arc<PresenceRegistry>,
        connections: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            ledger,
            presence,
            connections,
        }
    }

    /// Persist a message and push it to the receiver's live connection when
    /// one exists. The persisted message is returned to the caller either
    /// way, so the sender can render it immediately.
    pub async fn send(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        group_id: GroupId,
        body: &str,
    ) -> Result<Message, BackendError> {
        // Durability never depends on delivery.
        let message = self.ledger.append(group_id, sender_id, body).await?;

        match self.presence.connection_for(receiver_id).await {
            Some(connection_id) => {
                let delivered = self
                    .connections
                    .push(connection_id, ServerEvent::ReceiveMessage(message.clone()));
                if delivered {
                    tracing::debug!(
                        "[Router] delivered message {} to {} on connection {}",
                        message.id,
                        receiver_id,
                        connection_id
                    );
                } else {
                    tracing::debug!(
                        "[Router] connection {} for {} is gone; message {} stays in the ledger",
                        connection_id,
                        receiver_id,
                        message.id
                    );
                }
            }
            None => {
                tracing::debug!(
                    "[Router] {} is offline; message {} stays in the ledger",
                    receiver_id,
                    message.id
                );
            }
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn setup() -> (MessageRouter, Arc<ConversationLedger>, Arc<PresenceRegistry>, Arc<ConnectionRegistry>) {
        let ledger = Arc::new(ConversationLedger::new(None));
        let presence = Arc::new(PresenceRegistry::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let router = MessageRouter::new(ledger.clone(), presence.clone(), connections.clone());
        (router, ledger, presence, connections)
    }

    #[tokio::test]
    async fn test_send_to_offline_receiver_still_persists() {
        let (router, ledger, _, _) = setup();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = ledger.ensure_duo(a, b).await.unwrap();

        let message = router.send(a, b, group.id, "hi").await.unwrap();

        let stored = ledger.messages_for_group(group.id).await.unwrap();
        assert_eq!(stored, vec![message]);
    }

    #[tokio::test]
    async fn test_send_to_online_receiver_pushes_identical_message() {
        let (router, ledger, presence, connections) = setup();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = ledger.ensure_duo(a, b).await.unwrap();

        let conn = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        connections.register(conn, tx);
        presence.bind(conn, b).await;

        let acked = router.send(a, b, group.id, "hi").await.unwrap();

        match rx.recv().await.unwrap() {
            ServerEvent::ReceiveMessage(message) => {
                assert_eq!(message, acked);
                assert_eq!(
                    ledger.messages_for_group(group.id).await.unwrap(),
                    vec![message]
                );
            }
            other => panic!("expected receive-message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_with_closed_channel_is_a_miss_not_an_error() {
        let (router, ledger, presence, connections) = setup();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = ledger.ensure_duo(a, b).await.unwrap();

        let conn = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        connections.register(conn, tx);
        presence.bind(conn, b).await;
        drop(rx);

        assert!(router.send(a, b, group.id, "hi").await.is_ok());
        assert_eq!(ledger.messages_for_group(group.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_append_delivers_nothing() {
        let (router, _, presence, connections) = setup();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let conn = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        connections.register(conn, tx);
        presence.bind(conn, b).await;

        // unknown group: append fails, nothing may reach the receiver
        assert!(router.send(a, b, Uuid::new_v4(), "hi").await.is_err());
        assert!(rx.try_recv().is_err());
    }
}
