//! Client frame codec
//!
//! Text frames sent by an attached client are either control frames
//! (`SUBSCRIBE <roomId>`, `UNSUBSCRIBE`) or content frames carrying a JSON
//! message draft.

use std::fmt;

pub const SUBSCRIBE_PREFIX: &str = "SUBSCRIBE ";
pub const UNSUBSCRIBE_PREFIX: &str = "UNSUBSCRIBE";

/// A decoded client text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Join a room; the argument is not validated yet
    Subscribe(String),
    /// Leave the current room
    Unsubscribe,
    /// Anything else: a message for the current room
    Content(String),
}

impl ClientFrame {
    pub fn parse(raw: &str) -> Self {
        if let Some(room) = raw.strip_prefix(SUBSCRIBE_PREFIX) {
            ClientFrame::Subscribe(room.to_string())
        } else if raw.starts_with(UNSUBSCRIBE_PREFIX) {
            ClientFrame::Unsubscribe
        } else {
            ClientFrame::Content(raw.to_string())
        }
    }

    pub fn subscribe(room: impl Into<String>) -> Self {
        ClientFrame::Subscribe(room.into())
    }
}

impl fmt::Display for ClientFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFrame::Subscribe(room) => write!(f, "{}{}", SUBSCRIBE_PREFIX, room),
            ClientFrame::Unsubscribe => f.write_str(UNSUBSCRIBE_PREFIX),
            ClientFrame::Content(body) => f.write_str(body),
        }
    }
}
