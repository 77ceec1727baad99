//! Room hub - the broadcast engine and its shared state
//!
//! One lock covers both the history store and the membership registry, so
//! that appending a message and snapshotting the room's members happen as a
//! single critical section. Fan-out happens inside that section too, so each
//! member's queue receives a room's messages in history order. It never waits
//! on a connection: each member gets a `try_send` on its own bounded outbound
//! queue, and the socket write happens in the transport task.

use crate::config::RelayConfig;
use crate::connection::{ConnectionHandle, ConnectionId, DeliveryError, Outbound, OutboundReceiver};
use crate::error::{RelayError, RelayResult};
use crate::history::{AppendOutcome, HistoryStore};
use crate::membership::MembershipRegistry;
use crate::message::{Message, MessageDraft};
use crate::room::RoomId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct RelayState {
    history: HistoryStore,
    membership: MembershipRegistry,
    attached: HashMap<ConnectionId, ConnectionHandle>,
}

/// Shared relay state plus the publish path
#[derive(Debug)]
pub struct RoomHub {
    config: RelayConfig,
    state: RwLock<RelayState>,
}

/// Outcome of fanning one message out to a membership snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members whose queue accepted the frame
    pub delivered: usize,
    /// Members whose queue was full; they miss this message
    pub dropped: Vec<ConnectionId>,
    /// Members whose transport had already gone away
    pub closed: Vec<ConnectionId>,
}

impl BroadcastReport {
    pub fn total_attempted(&self) -> usize {
        self.delivered + self.dropped.len() + self.closed.len()
    }
}

/// A stored and broadcast message
#[derive(Debug, Clone)]
pub struct Published {
    pub message: Message,
    pub report: BroadcastReport,
}

/// Per-room counters for the admin view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub room_id: RoomId,
    pub messages: usize,
    pub members: usize,
}

/// Read-only snapshot of the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayInfo {
    /// Attached connections, joined or not
    pub connections: usize,
    /// Rooms holding history
    pub rooms: usize,
    /// Every room with history or members, sorted by id
    pub room_stats: Vec<RoomStats>,
}

impl RoomHub {
    pub fn new(config: RelayConfig) -> Self {
        let history = HistoryStore::new(config.max_messages, config.max_rooms);
        Self {
            config,
            state: RwLock::new(RelayState {
                history,
                membership: MembershipRegistry::new(),
                attached: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Attach a new connection under a fresh id
    pub async fn attach(&self) -> (ConnectionHandle, OutboundReceiver) {
        self.attach_with_id(ConnectionId::new()).await
    }

    /// Attach a connection whose id the transport generated
    pub async fn attach_with_id(&self, id: ConnectionId) -> (ConnectionHandle, OutboundReceiver) {
        let (handle, receiver) = ConnectionHandle::channel(id, self.config.outbound_queue_capacity);
        let mut state = self.state.write().await;
        if let Some(stale) = state.attached.insert(id, handle.clone()) {
            // Same id re-attached: the old queue is gone, so is its membership.
            state.membership.leave(stale.id());
        }
        debug!(connection_id = %id, "connection attached");
        (handle, receiver)
    }

    /// Place an attached connection in a room, leaving its previous room
    pub async fn join(&self, connection_id: ConnectionId, room: &str) -> RelayResult<RoomId> {
        let room_id = RoomId::parse(room)?;
        let mut state = self.state.write().await;
        let handle = state
            .attached
            .get(&connection_id)
            .cloned()
            .ok_or(RelayError::UnknownConnection(connection_id))?;
        let previous = state.membership.join(handle, &room_id);
        drop(state);

        info!(
            connection_id = %connection_id,
            room_id = %room_id,
            previous_room = previous.as_ref().map(RoomId::as_str),
            "connection subscribed room"
        );
        Ok(room_id)
    }

    /// Leave the current room. Idempotent.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<RoomId> {
        let left = self.state.write().await.membership.leave(connection_id);
        if let Some(room_id) = &left {
            info!(connection_id = %connection_id, room_id = %room_id, "connection unsubscribed room");
        }
        left
    }

    /// Forget a connection whose transport closed. Idempotent.
    pub async fn detach(&self, connection_id: ConnectionId) -> Option<RoomId> {
        let left = {
            let mut state = self.state.write().await;
            state.attached.remove(&connection_id);
            state.membership.leave(connection_id)
        };
        info!(
            connection_id = %connection_id,
            room_id = left.as_ref().map(RoomId::as_str),
            "connection closed"
        );
        left
    }

    /// Room a connection currently occupies
    pub async fn room_of(&self, connection_id: ConnectionId) -> Option<RoomId> {
        self.state
            .read()
            .await
            .membership
            .room_of(connection_id)
            .cloned()
    }

    /// Publish on behalf of an external caller.
    ///
    /// The room id and the draft are both validated before any state is
    /// touched.
    pub async fn publish(&self, room: &str, draft: MessageDraft) -> RelayResult<Published> {
        let room_id = RoomId::parse(room)?;
        draft.validate_external()?;
        self.dispatch(room_id, draft).await
    }

    /// Publish a content frame received on an attached connection.
    ///
    /// The frame goes to the connection's current room. Its draft is taken as
    /// is, without the external sender/payload rules.
    pub async fn relay(&self, connection_id: ConnectionId, raw: &str) -> RelayResult<Published> {
        let room_id = self
            .room_of(connection_id)
            .await
            .ok_or(RelayError::NotJoined(connection_id))?;
        let draft: MessageDraft = serde_json::from_str(raw).map_err(RelayError::malformed)?;
        self.dispatch(room_id, draft).await
    }

    async fn dispatch(&self, room_id: RoomId, draft: MessageDraft) -> RelayResult<Published> {
        let message = Message::stamp(room_id.clone(), draft);
        let json = serde_json::to_string(&message).map_err(RelayError::malformed)?;
        let frame: Outbound = Arc::from(json);

        // Enqueue while the append is still held so every member sees
        // messages in history order. `try_deliver` never waits.
        let report = {
            let mut state = self.state.write().await;
            match state.history.append(&room_id, message.clone()) {
                AppendOutcome::RoomCapExceeded => {
                    warn!(
                        room_id = %room_id,
                        rooms = state.history.count_rooms(),
                        "no more rooms allowed"
                    );
                    return Err(RelayError::RoomCapExceeded {
                        room_id,
                        max_rooms: self.config.max_rooms,
                    });
                }
                AppendOutcome::StoredWithEviction => {
                    debug!(room_id = %room_id, "history full, evicted oldest message");
                }
                AppendOutcome::Stored => {}
            }

            let members = state.membership.members_of(&room_id);
            let report = fan_out(&message, &frame, &members);
            for id in &report.closed {
                state.membership.leave_room(*id, &room_id);
            }
            report
        };

        info!(
            room_id = %room_id,
            message_id = %message.message_id,
            sender = %message.sender,
            recipients = report.total_attempted(),
            "message published"
        );
        Ok(Published { message, report })
    }

    /// Stored messages of a room, oldest first
    pub async fn history(&self, room: &str) -> RelayResult<Vec<Message>> {
        let room_id = RoomId::parse(room)?;
        self.state.read().await.history.list(&room_id)
    }

    /// Snapshot of a room's members
    pub async fn members_of(&self, room: &str) -> RelayResult<Vec<ConnectionHandle>> {
        let room_id = RoomId::parse(room)?;
        Ok(self.state.read().await.membership.members_of(&room_id))
    }

    /// Clear every room's history. Connections stay joined to their rooms.
    pub async fn reset_all(&self) {
        let mut state = self.state.write().await;
        let rooms = state.history.count_rooms();
        state.history.clear();
        info!(rooms, "history reset");
    }

    pub async fn count_rooms(&self) -> usize {
        self.state.read().await.history.count_rooms()
    }

    pub async fn count_messages(&self, room: &str) -> RelayResult<usize> {
        let room_id = RoomId::parse(room)?;
        Ok(self.state.read().await.history.count_messages(&room_id))
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.attached.len()
    }

    pub async fn info(&self) -> RelayInfo {
        let state = self.state.read().await;

        let mut rooms: BTreeMap<RoomId, RoomStats> = BTreeMap::new();
        for (room_id, messages) in state.history.room_counts() {
            rooms.insert(
                room_id.clone(),
                RoomStats {
                    members: state.membership.member_count(&room_id),
                    room_id,
                    messages,
                },
            );
        }
        for room_id in state.membership.occupied_rooms() {
            rooms.entry(room_id.clone()).or_insert_with(|| RoomStats {
                room_id: room_id.clone(),
                messages: 0,
                members: state.membership.member_count(room_id),
            });
        }

        RelayInfo {
            connections: state.attached.len(),
            rooms: state.history.count_rooms(),
            room_stats: rooms.into_values().collect(),
        }
    }
}

fn fan_out(message: &Message, frame: &Outbound, members: &[ConnectionHandle]) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for member in members {
        match member.try_deliver(Arc::clone(frame)) {
            Ok(()) => report.delivered += 1,
            Err(DeliveryError::Full) => {
                warn!(
                    connection_id = %member.id(),
                    room_id = %message.room_id,
                    total_drops = member.stats().dropped(),
                    "outbound queue full, message dropped"
                );
                report.dropped.push(member.id());
            }
            Err(DeliveryError::Closed) => {
                debug!(connection_id = %member.id(), "member transport already closed");
                report.closed.push(member.id());
            }
        }
    }
    report
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
