//! External publish and history routes

use crate::errors::{HttpError, HttpResult};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use roomcast_core::{Message, MessageDraft, RoomId};
use tracing::debug;

/// `POST /room/:room_id/messages`
///
/// The body is decoded as JSON whatever its `Content-Type`. The room id is
/// checked before the body so a bad path wins over a bad payload.
pub async fn publish_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> HttpResult<Json<Message>> {
    RoomId::parse(&room_id)?;
    let draft: MessageDraft = serde_json::from_slice(&body).map_err(|e| {
        debug!(room_id = %room_id, error = %e, "rejected publish body");
        HttpError::bad_request(format!("Invalid JSON body: {}", e))
    })?;

    let published = state.hub.publish(&room_id, draft).await?;
    Ok(Json(published.message))
}

/// `GET /room/:room_id/messages`
pub async fn room_history(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> HttpResult<Json<Vec<Message>>> {
    Ok(Json(state.hub.history(&room_id).await?))
}
