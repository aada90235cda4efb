//! WebSocket Adapter
//!
//! Maps one WebSocket connection onto one [`Session`]. The client may bind
//! its identity in the upgrade query (`/ws?userId=...`) or later with a
//! `connect` event. Inbound frames are parsed into `ClientEvent`s and
//! handled in arrival order; outbound `ServerEvent`s flow through the
//! session's mpsc channel into the socket.
//!
//! Cleanup does not rely on a disconnect handshake: whatever ends the read
//! loop (an explicit `disconnect` event, a close frame, or the socket
//! dropping), the session is closed and presence unbound.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::backend::server::state::AppState;
use crate::backend::session::Session;
use crate::shared::{ClientEvent, ServerEvent, UserId};

#[derive(Debug, Deserialize)]
pub struct HandshakeQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<UserId>,
}

/// `GET /ws` - upgrade to the real-time channel.
pub async fn handle_upgrade(
    State(state): State<AppState>,
    Query(handshake): Query<HandshakeQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_connection(state, handshake.user_id, socket))
}

async fn run_connection(state: AppState, user_id: Option<UserId>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut events) = mpsc::unbounded_channel::<ServerEvent>();

    let mut session = Session::open(state.session_services(), user_id, outbound.clone()).await;
    let connection_id = session.connection_id();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("[Ws] failed to serialize outbound event: {}", e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    let disconnect = matches!(event, ClientEvent::Disconnect);
                    session.handle(event).await;
                    if disconnect {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("[Ws] {} sent an unparseable event: {}", connection_id, e);
                    let _ = outbound.send(ServerEvent::Error {
                        message: format!("unparseable event: {e}"),
                    });
                }
            },
            WsMessage::Close(_) => break,
            // pings are answered by axum; binary frames are not part of
            // the protocol
            _ => {}
        }
    }

    session.close().await;
    writer.abort();
}
