//! Message types
//!
//! A [`Message`] is immutable once stamped. The history store owns the stored
//! copy; every subscriber receives its own serialised copy.

use crate::error::{RelayError, RelayResult};
use crate::room::RoomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for published messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied part of a message
///
/// Unknown fields are ignored, so a client echoing a whole message back
/// cannot override the id, room or timestamp the relay assigns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub data: String,
}

impl MessageDraft {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    /// Rules for messages published from outside a room connection:
    /// a sender is required, and at least one of `text`/`data`.
    pub fn validate_external(&self) -> RelayResult<()> {
        if self.sender.is_empty() {
            return Err(RelayError::validation(
                "Sender invalid. Please provide a 'sender' property.",
            ));
        }
        if self.text.is_empty() && self.data.is_empty() {
            return Err(RelayError::validation(
                "Payload invalid. Please provide a 'text' property and/or 'data' property.",
            ));
        }
        Ok(())
    }
}

/// A published message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    pub room_id: RoomId,
    pub sender: String,
    pub text: String,
    pub data: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Finalise a draft: assign a fresh id and the current wall-clock time
    pub fn stamp(room_id: RoomId, draft: MessageDraft) -> Self {
        Self {
            message_id: MessageId::new(),
            room_id,
            sender: draft.sender,
            text: draft.text,
            data: draft.data,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_publish_requires_sender() {
        let draft = MessageDraft::new("").with_text("hello");
        let err = draft.validate_external().unwrap_err();
        assert!(matches!(err, RelayError::ValidationFailed { .. }));
        assert!(err.to_string().contains("sender"));
    }

    #[test]
    fn test_external_publish_requires_payload() {
        let err = MessageDraft::new("alice").validate_external().unwrap_err();
        assert!(err.to_string().contains("'text'"));

        assert!(MessageDraft::new("alice")
            .with_text("hi")
            .validate_external()
            .is_ok());
        assert!(MessageDraft::new("alice")
            .with_data("{\"x\":1}")
            .validate_external()
            .is_ok());
    }

    #[test]
    fn test_stamp_assigns_identity() {
        let room = RoomId::parse("general").unwrap();
        let first = Message::stamp(room.clone(), MessageDraft::new("a").with_text("1"));
        let second = Message::stamp(room.clone(), MessageDraft::new("a").with_text("1"));

        assert_ne!(first.message_id, second.message_id);
        assert_eq!(first.room_id, room);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let msg = Message::stamp(
            RoomId::parse("general").unwrap(),
            MessageDraft::new("bob").with_text("hey"),
        );
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["roomId"], "general");
        assert_eq!(value["sender"], "bob");
        assert_eq!(value["text"], "hey");
        assert_eq!(value["data"], "");
        assert!(value["messageId"].is_string());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_draft_ignores_relay_assigned_fields() {
        let draft: MessageDraft = serde_json::from_str(
            r#"{"messageId":"spoofed","roomId":"other","sender":"eve","text":"x"}"#,
        )
        .unwrap();
        assert_eq!(draft, MessageDraft::new("eve").with_text("x"));
    }
}
