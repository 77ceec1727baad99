//! Relay error types
//!
//! Every variant is a recoverable, caller-visible condition. Per-member send
//! failures during fan-out are not errors at all: they are reported in
//! [`BroadcastReport`](crate::hub::BroadcastReport) and logged.

use crate::connection::ConnectionId;
use crate::room::RoomId;
use thiserror::Error;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Relay errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Invalid room id: {0:?}")]
    InvalidRoomId(String),

    #[error("Room limit reached ({max_rooms}), cannot create room {room_id}")]
    RoomCapExceeded { room_id: RoomId, max_rooms: usize },

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Connection {0} is not joined to any room")]
    NotJoined(ConnectionId),

    #[error("Connection {0} is not attached")]
    UnknownConnection(ConnectionId),

    #[error("Malformed content frame: {0}")]
    MalformedFrame(String),
}

impl RelayError {
    /// Create a validation error
    pub fn validation<T: Into<String>>(message: T) -> Self {
        RelayError::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create a malformed frame error
    pub fn malformed<T: ToString>(reason: T) -> Self {
        RelayError::MalformedFrame(reason.to_string())
    }

    /// Stable machine-readable code, used in HTTP error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayError::InvalidRoomId(_) => "INVALID_ROOM_ID",
            RelayError::RoomCapExceeded { .. } => "ROOM_CAP_EXCEEDED",
            RelayError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            RelayError::ValidationFailed { .. } => "VALIDATION_FAILED",
            RelayError::NotJoined(_) => "NOT_JOINED",
            RelayError::UnknownConnection(_) => "UNKNOWN_CONNECTION",
            RelayError::MalformedFrame(_) => "MALFORMED_FRAME",
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}
