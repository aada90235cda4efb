//! Server Initialization
//!
//! Wires the components together and builds the axum application:
//!
//! 1. Load the optional database pool
//! 2. Build the ledger (and restore persisted state when a pool exists)
//! 3. Build graph, presence, visibility, router, and connection registry
//! 4. Configure the router

use std::sync::Arc;

use axum::Router;

use crate::backend::delivery::{ConnectionRegistry, MessageRouter};
use crate::backend::graph::SocialGraph;
use crate::backend::ledger::ConversationLedger;
use crate::backend::presence::PresenceRegistry;
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::backend::visibility::VisibilityCompiler;

/// Create the axum application with all components wired.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing ripple backend server");

    let db_pool = load_database().await;

    let ledger = Arc::new(ConversationLedger::new(db_pool.clone()));
    if db_pool.is_some() {
        match ledger.restore().await {
            Ok((groups, messages)) => {
                tracing::info!("Restored {} groups and {} messages from store", groups, messages);
            }
            Err(e) => {
                tracing::error!("Failed to restore ledger state: {}", e);
            }
        }
    }

    let graph = Arc::new(SocialGraph::new(ledger.clone()));
    let presence = Arc::new(PresenceRegistry::new());
    let visibility = Arc::new(VisibilityCompiler::new(graph.clone(), presence.clone()));
    let connections = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(MessageRouter::new(
        ledger.clone(),
        presence.clone(),
        connections.clone(),
    ));

    tracing::info!("Components initialized");

    let app_state = AppState {
        graph,
        presence,
        ledger,
        visibility,
        router,
        connections,
        db_pool,
    };

    create_router(app_state)
}
