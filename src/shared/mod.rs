//! Shared Domain Types
//!
//! Types shared between the server components and clients of the wire
//! protocol: identities, presence records, groups, messages, the follow-set
//! algebra, wire events, and core error types.

pub mod error;
pub mod event;
pub mod chat;
pub mod presence;
pub mod social;

pub use error::CoreError;
pub use event::{ClientEvent, ServerEvent};
pub use chat::{Group, GroupKind, Message, OnlinePeers};
pub use presence::PresenceRecord;
pub use social::FollowSets;

use uuid::Uuid;

/// Opaque user identity. Accounts are owned by an external subsystem; the
/// core only ever references ids.
pub type UserId = Uuid;

/// Conversation container id.
pub type GroupId = Uuid;

/// Message id.
pub type MessageId = Uuid;

/// Identifier of one live connection. Assigned when the connection opens
/// and never reused.
pub type ConnectionId = Uuid;
