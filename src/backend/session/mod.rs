//! Connection Session Manager
//!
//! Owns the lifecycle of one live connection: identity binding on connect,
//! event handling while open, cleanup on disconnect. Each inbound event is
//! a typed message dispatched here; the session never touches component
//! state except through the owning component's methods.
//!
//! Cleanup is unconditional: `close` runs whether or not the connection
//! ever bound an identity, and whether it ended with an explicit
//! disconnect event or an abrupt socket drop.

use std::sync::Arc;
use uuid::Uuid;

use crate::backend::delivery::{ConnectionRegistry, MessageRouter, OutboundSender};
use crate::backend::presence::PresenceRegistry;
use crate::backend::visibility::VisibilityCompiler;
use crate::shared::{ClientEvent, ConnectionId, ServerEvent, UserId};

/// Handles to the components a session drives.
#[derive(Debug, Clone)]
pub struct SessionServices {
    pub presence: Arc<PresenceRegistry>,
    pub visibility: Arc<VisibilityCompiler>,
    pub router: Arc<MessageRouter>,
    pub connections: Arc<ConnectionRegistry>,
}

/// One live connection's session.
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    user_id: Option<UserId>,
    outbound: OutboundSender,
    services: SessionServices,
    closed: bool,
}

impl Session {
    /// Open a session: assign a connection id, register the outbound
    /// channel, and bind presence when an identity came with the handshake.
    pub async fn open(
        services: SessionServices,
        user_id: Option<UserId>,
        outbound: OutboundSender,
    ) -> Self {
        let connection_id = Uuid::new_v4();
        services.connections.register(connection_id, outbound.clone());

        if let Some(user_id) = user_id {
            services.presence.bind(connection_id, user_id).await;
        }
        tracing::info!("[Session] connection {} opened", connection_id);

        Self {
            connection_id,
            user_id,
            outbound,
            services,
            closed: false,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Handle one inbound event. Events of a single connection arrive in
    /// order; failures are reported back over the connection and never
    /// close it.
    pub async fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Connect { user_id } => {
                if let Some(user_id) = user_id {
                    self.services.presence.bind(self.connection_id, user_id).await;
                    self.user_id = Some(user_id);
                }
            }

            ClientEvent::CollectOnlinePeers { user_id } => {
                match self.services.visibility.online_network(user_id).await {
                    Ok(peers) => self.push(ServerEvent::OnlinePeers(peers)),
                    Err(error) => self.report(error.to_string()),
                }
            }

            ClientEvent::SendMessage {
                message,
                sender_id,
                group_id,
                receiver_id,
            } => {
                match self
                    .services
                    .router
                    .send(sender_id, receiver_id, group_id, &message)
                    .await
                {
                    Ok(message) => self.push(ServerEvent::MessageAck(message)),
                    Err(error) => self.report(error.to_string()),
                }
            }

            ClientEvent::Disconnect => {
                self.close().await;
            }
        }
    }

    /// Tear the session down: unregister the connection and unbind
    /// presence. Safe to call more than once; unbind on a connection that
    /// never bound is a no-op inside the registry.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.services.connections.unregister(self.connection_id);
        self.services.presence.unbind(self.connection_id).await;
        tracing::info!("[Session] connection {} closed", self.connection_id);
    }

    fn push(&self, event: ServerEvent) {
        if self.outbound.send(event).is_err() {
            tracing::debug!(
                "[Session] outbound channel for {} already closed",
                self.connection_id
            );
        }
    }

    fn report(&self, message: String) {
        tracing::warn!("[Session] {}: {}", self.connection_id, message);
        self.push(ServerEvent::Error { message });
    }
}
