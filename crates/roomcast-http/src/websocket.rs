//! WebSocket transport
//!
//! One task per socket. It reads client frames into a
//! [`ConnectionSession`] and writes whatever the hub queues for this
//! connection, until either side goes away.

use crate::state::AppState;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use roomcast_core::{ConnectionSession, RoomHub, SessionFlow};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `GET /ws`
pub async fn websocket_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| drive_socket(socket, state.hub))
}

/// Run a socket to completion
pub async fn drive_socket(socket: WebSocket, hub: Arc<RoomHub>) {
    let (session, mut outbound) = ConnectionSession::open(hub).await;
    let connection_id = session.id();
    let (mut sink, mut stream) = socket.split();
    info!(connection_id = %connection_id, "websocket connected");

    loop {
        tokio::select! {
            inbound = stream.next() => {
                let text = match inbound {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!(connection_id = %connection_id, "dropping non-UTF-8 binary frame");
                            continue;
                        }
                    },
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!(connection_id = %connection_id, "client closed");
                        break;
                    }
                    // Pings are answered by the server itself
                    Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => continue,
                    Some(Err(e)) => {
                        warn!(connection_id = %connection_id, error = %e, "websocket read failed");
                        break;
                    }
                };

                if session.handle_text(&text).await == SessionFlow::Close {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    break;
                }
            }

            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = sink.send(WsMessage::Text(frame.to_string())).await {
                    warn!(connection_id = %connection_id, error = %e, "websocket write failed");
                    break;
                }
            }
        }
    }

    let room = session.finish().await;
    info!(
        connection_id = %connection_id,
        room_id = room.as_ref().map(|r| r.as_str()).unwrap_or("-"),
        "websocket disconnected"
    );
}
