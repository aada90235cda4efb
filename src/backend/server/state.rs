//! Application State
//!
//! `AppState` is the central state container handed to the axum router.
//! It holds one shared handle per component. Components exclusively own
//! their records; handlers never reach into component internals.
//!
//! The `FromRef` implementations let handlers extract just the component
//! they use instead of the whole `AppState`, axum's recommended pattern.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::delivery::{ConnectionRegistry, MessageRouter};
use crate::backend::graph::SocialGraph;
use crate::backend::ledger::ConversationLedger;
use crate::backend::presence::PresenceRegistry;
use crate::backend::session::SessionServices;
use crate::backend::visibility::VisibilityCompiler;

/// Shared handles to every component of the messaging core.
#[derive(Clone)]
pub struct AppState {
    /// Follow graph store
    pub graph: Arc<SocialGraph>,
    /// Presence registry
    pub presence: Arc<PresenceRegistry>,
    /// Durable conversation ledger
    pub ledger: Arc<ConversationLedger>,
    /// Derived-set compiler over graph + presence
    pub visibility: Arc<VisibilityCompiler>,
    /// Persist-then-deliver message router
    pub router: Arc<MessageRouter>,
    /// Live connection channels
    pub connections: Arc<ConnectionRegistry>,
    /// `None` when running without persistence
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// The handle bundle a connection session needs.
    pub fn session_services(&self) -> SessionServices {
        SessionServices {
            presence: self.presence.clone(),
            visibility: self.visibility.clone(),
            router: self.router.clone(),
            connections: self.connections.clone(),
        }
    }
}

impl FromRef<AppState> for Arc<SocialGraph> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.graph.clone()
    }
}

impl FromRef<AppState> for Arc<PresenceRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.presence.clone()
    }
}

impl FromRef<AppState> for Arc<ConversationLedger> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.ledger.clone()
    }
}

impl FromRef<AppState> for Arc<VisibilityCompiler> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.visibility.clone()
    }
}

impl FromRef<AppState> for Arc<MessageRouter> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.router.clone()
    }
}

impl FromRef<AppState> for Arc<ConnectionRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.connections.clone()
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
