//! Wire Events
//!
//! The real-time channel speaks JSON events, one logical connection per
//! client. Event names are kebab-case and payload fields camelCase, e.g.:
//!
//! ```json
//! {"event":"send-message","message":"hi","senderId":"...","groupId":"...","receiverId":"..."}
//! ```

use serde::{Deserialize, Serialize};

use super::chat::{Message, OnlinePeers};
use super::{GroupId, UserId};

/// Events a client sends over its connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Handshake. Binds presence when an identity is supplied; a connection
    /// may also open anonymously and bind later.
    Connect { user_id: Option<UserId> },

    /// Ask for the online subset of the user's network.
    CollectOnlinePeers { user_id: UserId },

    /// Send a chat message. Persisted always; delivered to the receiver's
    /// live connection when one exists.
    SendMessage {
        message: String,
        sender_id: UserId,
        group_id: GroupId,
        receiver_id: UserId,
    },

    /// Explicit disconnect. Cleanup also runs when the connection simply
    /// drops, so this is an optimization, not a requirement.
    Disconnect,
}

/// Events the server pushes to a client. Payload fields sit beside the
/// `event` tag, e.g. `{"event":"online-peers","onlineUserIds":[...],...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Response to `collect-online-peers`.
    OnlinePeers(OnlinePeers),

    /// A message pushed to its receiver's live connection.
    ReceiveMessage(Message),

    /// Synchronous acknowledgement to the sender, carrying the persisted
    /// message so the caller can render it immediately.
    MessageAck(Message),

    /// A request failed; the connection stays open.
    Error { message: String },
}
