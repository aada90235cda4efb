//! Server-Side Components
//!
//! The components that make up the messaging core, plus the axum shell
//! that exposes them. Each component exclusively owns its records; all
//! cross-component reads go through query methods, never shared memory.

pub mod error;
pub mod graph;
pub mod presence;
pub mod visibility;
pub mod ledger;
pub mod delivery;
pub mod session;
pub mod server;
pub mod routes;
