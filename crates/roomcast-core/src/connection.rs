//! Connection handles
//!
//! A [`ConnectionHandle`] is the registry's view of one attached subscriber:
//! an id plus the sending half of that connection's bounded outbound queue.
//! The transport owns the receiving half and drains it into the socket, so a
//! slow socket only ever fills its own queue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique identifier for attached connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One serialised frame queued for a connection.
///
/// Shared between all recipients of a single publish.
pub type Outbound = Arc<str>;

/// Receiving half of a connection's outbound queue
pub type OutboundReceiver = mpsc::Receiver<Outbound>;

/// Why a frame could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound queue full")]
    Full,
    #[error("connection closed")]
    Closed,
}

/// Delivery counters for one connection
#[derive(Debug, Default)]
pub struct ConnectionStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl ConnectionStats {
    /// Frames accepted into the outbound queue
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Frames dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Opaque, cloneable handle to an attached connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<Outbound>,
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandle {
    /// Create a handle and the receiving half of its outbound queue
    pub fn channel(id: ConnectionId, capacity: usize) -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id,
            sender,
            stats: Arc::new(ConnectionStats::default()),
        };
        (handle, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// True once the transport dropped its receiver
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queue a frame without waiting
    pub fn try_deliver(&self, frame: Outbound) -> Result<(), DeliveryError> {
        match self.sender.try_send(frame) {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Err(DeliveryError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}
