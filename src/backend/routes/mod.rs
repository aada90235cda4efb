//! HTTP Routes
//!
//! The axum surface: a WebSocket endpoint for the real-time channel and a
//! JSON API for the query-side operations.

pub mod router;
pub mod api;
pub mod ws;

pub use router::create_router;
