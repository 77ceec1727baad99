//! HTTP server error types
//!
//! Relay errors pass through unchanged and pick their status code here, so
//! handlers can use `?` on every hub call.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roomcast_core::{ConfigError, RelayError};
use serde_json::json;
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// HTTP server errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Server startup failed: {message}")]
    StartupFailed { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl HttpError {
    /// Create a startup error
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::StartupFailed {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Relay(relay) => match relay {
                RelayError::InvalidRoomId(_)
                | RelayError::ValidationFailed { .. }
                | RelayError::MalformedFrame(_) => StatusCode::BAD_REQUEST,
                RelayError::RoomNotFound(_) => StatusCode::NOT_FOUND,
                RelayError::RoomCapExceeded { .. } => StatusCode::SERVICE_UNAVAILABLE,
                RelayError::NotJoined(_) => StatusCode::CONFLICT,
                RelayError::UnknownConnection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HttpError::StartupFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::Relay(relay) => relay.error_code(),
            HttpError::StartupFailed { .. } => "SERVER_STARTUP_FAILED",
            HttpError::Config(_) => "CONFIG_ERROR",
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::Unauthorized => "UNAUTHORIZED",
            HttpError::Forbidden { .. } => "FORBIDDEN",
            HttpError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get error hint for user guidance
    pub fn error_hint(&self) -> Option<&'static str> {
        match self {
            HttpError::Relay(RelayError::InvalidRoomId(_)) => {
                Some("Room ids may only contain letters, digits, '-' and '_'")
            }
            HttpError::Relay(RelayError::RoomCapExceeded { .. }) => {
                Some("Publish to an existing room or ask an operator to reset the relay")
            }
            HttpError::Relay(RelayError::RoomNotFound(_)) => {
                Some("The room has no history yet")
            }
            HttpError::BadRequest { .. } => Some("Check request format and parameters"),
            _ => None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "hint": self.error_hint()
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_core::RoomId;
    use tracing_test::traced_test;

    #[test]
    fn test_relay_status_codes() {
        let room = RoomId::parse("lobby").unwrap();
        let cases = [
            (RelayError::InvalidRoomId("a/b".into()), StatusCode::BAD_REQUEST),
            (RelayError::validation("sender"), StatusCode::BAD_REQUEST),
            (RelayError::malformed("eof"), StatusCode::BAD_REQUEST),
            (RelayError::RoomNotFound(room.clone()), StatusCode::NOT_FOUND),
            (
                RelayError::RoomCapExceeded {
                    room_id: room,
                    max_rooms: 1,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (relay, status) in cases {
            assert_eq!(HttpError::from(relay).status_code(), status);
        }
    }

    #[test]
    fn test_error_code_passes_through() {
        let err = HttpError::from(RelayError::RoomCapExceeded {
            room_id: RoomId::parse("r").unwrap(),
            max_rooms: 1,
        });
        assert_eq!(err.error_code(), "ROOM_CAP_EXCEEDED");
        assert!(err.error_hint().is_some());
    }

    #[test]
    fn test_plain_errors() {
        assert_eq!(HttpError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(HttpError::forbidden("set").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            HttpError::startup("bind").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(HttpError::bad_request("x").error_code(), "BAD_REQUEST");
    }

    #[test]
    fn test_config_errors_convert() {
        let err: HttpError =
            ConfigError::invalid_value("bind_addr", "nope", "socket address").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("bind_addr"));
    }

    #[traced_test]
    #[test]
    fn test_server_errors_are_logged() {
        let response = HttpError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs_contain("request failed"));

        let response = HttpError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
