//! Route table

pub mod admin;
pub mod health;
pub mod rooms;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::websocket::websocket_upgrade;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the relay router
///
/// Unmatched paths fall through to static files under `public_dir`.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/ws", get(websocket_upgrade))
        .route(
            "/room/:room_id/messages",
            post(rooms::publish_message).get(rooms::room_history),
        )
        .route("/admin/:token/settoken", post(admin::set_token))
        .route("/admin/:token/info", get(admin::relay_info))
        .route("/admin/:token/reset", post(admin::reset_history))
        .route("/health", get(health::health_check))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(DefaultBodyLimit::max(config.max_request_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
