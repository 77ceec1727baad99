//! Admin routes
//!
//! The token travels in the path. `settoken` can claim it once; every other
//! route answers 401 unless the presented token matches.

use crate::errors::{HttpError, HttpResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roomcast_core::RelayInfo;
use tracing::{info, warn};

/// `POST /admin/:token/settoken`
pub async fn set_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> HttpResult<StatusCode> {
    if state.admin.set_if_unset(&token).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!("rejected attempt to replace the admin token");
        Err(HttpError::forbidden("admin token is already set"))
    }
}

/// `GET /admin/:token/info`
pub async fn relay_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> HttpResult<Json<RelayInfo>> {
    authorize(&state, &token).await?;
    Ok(Json(state.hub.info().await))
}

/// `POST /admin/:token/reset`
pub async fn reset_history(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> HttpResult<StatusCode> {
    authorize(&state, &token).await?;
    state.hub.reset_all().await;
    info!("history reset by admin");
    Ok(StatusCode::NO_CONTENT)
}

async fn authorize(state: &AppState, token: &str) -> HttpResult<()> {
    if state.admin.verify(token).await {
        Ok(())
    } else {
        warn!("admin request with invalid token");
        Err(HttpError::Unauthorized)
    }
}
