//! Ripple - Social Messaging Core
//!
//! Ripple is the real-time core of a social-networking backend: a follow
//! graph with mutual-visibility set algebra, a presence registry mapping
//! user identities to live connections, a durable conversation ledger, and
//! a message router that persists first and delivers best-effort.
//!
//! # Module Structure
//!
//! - **`shared`** - Domain types used on both sides of the wire
//!   - Profiles, presence records, groups, messages
//!   - Follow-set algebra (mutual / unique / one-way)
//!   - Wire events and core error types
//!
//! - **`backend`** - Server-side components
//!   - Social graph store, presence registry, conversation ledger
//!   - Visibility compiler, message router, connection sessions
//!   - Axum WebSocket/JSON shell around the components

pub mod shared;
pub mod backend;
