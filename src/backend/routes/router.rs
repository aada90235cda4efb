//! Router Configuration
//!
//! Combines the real-time and query-side routes into one axum router.
//!
//! # Routes
//!
//! ## Real-time
//! - `GET /ws` - WebSocket upgrade; optional `?userId=` handshake binding
//!
//! ## Query side
//! - `POST /api/users` - create a profile (+ presence record)
//! - `POST /api/users/{id}/following/{target}` - follow
//! - `DELETE /api/users/{id}/following/{target}` - unfollow
//! - `GET /api/users/{id}/following` / `.../followers` - edge sets
//! - `GET /api/users/{id}/presence` - one user's presence record
//! - `GET /api/users/{id}/network/online` - online subset of the network
//! - `GET /api/users/{id}/feed/authors` - feed visibility set
//! - `GET /api/users/{id}/groups` - groups the user belongs to
//! - `POST /api/groups` - create a group
//! - `GET /api/groups/{id}/messages` - a group's conversation ledger
//! - `POST /api/groups/{id}/messages/{message_id}/seen` - mark seen

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::routes::{api, ws};
use crate::backend::server::state::AppState;

/// Create the axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/ws", get(ws::handle_upgrade))
        .route("/api/users", post(api::create_user))
        .route(
            "/api/users/{id}/following/{target}",
            post(api::follow).delete(api::unfollow),
        )
        .route("/api/users/{id}/following", get(api::get_following))
        .route("/api/users/{id}/followers", get(api::get_followers))
        .route("/api/users/{id}/presence", get(api::presence_record))
        .route("/api/users/{id}/network/online", get(api::online_network))
        .route("/api/users/{id}/feed/authors", get(api::feed_authors))
        .route("/api/users/{id}/groups", get(api::groups_for_user))
        .route("/api/groups", post(api::create_group))
        .route("/api/groups/{id}/messages", get(api::group_messages))
        .route(
            "/api/groups/{id}/messages/{message_id}/seen",
            post(api::mark_seen),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
