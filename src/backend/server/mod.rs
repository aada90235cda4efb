//! Server Shell
//!
//! Configuration loading, shared application state, and initialization for
//! the axum server wrapping the messaging core.

pub mod config;
pub mod state;
pub mod init;
