//! # roomcast-http
//!
//! HTTP and WebSocket front end for [`roomcast_core`].
//!
//! Routes:
//! - `GET /ws` - attach a WebSocket connection
//! - `POST /room/:room_id/messages` - publish without a connection
//! - `GET /room/:room_id/messages` - room history
//! - `/admin/:token/{settoken,info,reset}` - operator endpoints
//! - `GET /health`
//!
//! Anything else is served from the configured public directory.

pub mod config;
pub mod errors;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;
pub mod websocket;

pub use config::{ServerConfig, ServerDefaults};
pub use errors::{HttpError, HttpResult};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use routes::router;
pub use server::{serve, shutdown_signal, start_server};
pub use state::{AdminToken, AppState};
