//! Per-connection session driver
//!
//! Maps decoded client frames onto hub operations. The transport feeds every
//! inbound text frame to [`ConnectionSession::handle_text`] and calls
//! [`ConnectionSession::finish`] exactly once when the socket goes away;
//! `finish` consumes the session, so the closing leave cannot run twice.

use crate::connection::{ConnectionHandle, ConnectionId, OutboundReceiver};
use crate::error::RelayError;
use crate::frame::ClientFrame;
use crate::hub::RoomHub;
use crate::room::RoomId;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the transport should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Close,
}

pub struct ConnectionSession {
    hub: Arc<RoomHub>,
    handle: ConnectionHandle,
}

impl ConnectionSession {
    /// Attach a new connection to the hub
    pub async fn open(hub: Arc<RoomHub>) -> (Self, OutboundReceiver) {
        let (handle, receiver) = hub.attach().await;
        (Self { hub, handle }, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    pub async fn current_room(&self) -> Option<RoomId> {
        self.hub.room_of(self.id()).await
    }

    /// Apply one inbound text frame
    pub async fn handle_text(&self, raw: &str) -> SessionFlow {
        let id = self.id();
        match ClientFrame::parse(raw) {
            ClientFrame::Subscribe(room) => match self.hub.join(id, &room).await {
                Ok(_) => SessionFlow::Continue,
                Err(RelayError::InvalidRoomId(room)) => {
                    warn!(connection_id = %id, room_id = %room, "invalid room id, closing connection");
                    SessionFlow::Close
                }
                Err(e) => {
                    warn!(connection_id = %id, error = %e, "subscribe failed");
                    SessionFlow::Close
                }
            },
            ClientFrame::Unsubscribe => {
                self.hub.leave(id).await;
                SessionFlow::Continue
            }
            ClientFrame::Content(body) => {
                match self.hub.relay(id, &body).await {
                    Ok(_) => {}
                    Err(RelayError::NotJoined(_)) => {
                        debug!(connection_id = %id, "content frame outside a room ignored");
                    }
                    Err(e @ RelayError::MalformedFrame(_)) => {
                        warn!(connection_id = %id, error = %e, "dropping content frame");
                    }
                    Err(e) => {
                        warn!(connection_id = %id, error = %e, "content frame not published");
                    }
                }
                SessionFlow::Continue
            }
        }
    }

    /// Detach from the hub, leaving the current room
    pub async fn finish(self) -> Option<RoomId> {
        self.hub.detach(self.handle.id()).await
    }
}
