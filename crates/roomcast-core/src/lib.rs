//! # roomcast-core
//!
//! In-memory, room-based message relay core.
//!
//! Clients attach a connection, join a named room and receive every message
//! published to that room afterwards. Messages can also be published without
//! a connection. This crate holds the parts with real invariants:
//! - [`room`] - room id validation
//! - [`history`] - per-room FIFO history with a room-count cap
//! - [`membership`] - which connection sits in which room
//! - [`hub`] - the shared state and the publish/fan-out path
//! - [`frame`] and [`session`] - the client frame protocol and the
//!   per-connection driver a transport plugs into
//!
//! Socket I/O lives in the transport crate.
//!
//! ```rust
//! use roomcast_core::{MessageDraft, RoomHub};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = RoomHub::default();
//!     let (conn, mut outbound) = hub.attach().await;
//!     hub.join(conn.id(), "lobby").await?;
//!
//!     hub.publish("lobby", MessageDraft::new("alice").with_text("hi")).await?;
//!     assert!(outbound.recv().await.is_some());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod history;
pub mod hub;
pub mod membership;
pub mod message;
pub mod room;
pub mod session;

pub use config::{AppConfigTrait, ConfigSource, RelayConfig, RelayDefaults};
pub use connection::{
    ConnectionHandle, ConnectionId, ConnectionStats, DeliveryError, Outbound, OutboundReceiver,
};
pub use error::{ConfigError, RelayError, RelayResult};
pub use frame::ClientFrame;
pub use history::{AppendOutcome, HistoryStore};
pub use hub::{BroadcastReport, Published, RelayInfo, RoomHub, RoomStats};
pub use membership::MembershipRegistry;
pub use message::{Message, MessageDraft, MessageId};
pub use room::{is_valid_room_id, RoomId};
pub use session::{ConnectionSession, SessionFlow};
