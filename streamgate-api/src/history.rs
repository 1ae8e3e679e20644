use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::history::WatchEntry;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWatchRequest {
    pub user_id: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntryResponse {
    pub id: Uuid,
    pub user_id: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub duration: Option<String>,
    pub watched_at: DateTime<Utc>,
}

impl From<WatchEntry> for WatchEntryResponse {
    fn from(entry: WatchEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            event_id: entry.event_id,
            event_title: entry.event_title,
            duration: entry.duration,
            watched_at: entry.watched_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /history/{event_id}
/// Record that the caller watched a stream. Defaults to the token subject
/// when the body names nobody.
pub async fn log_watched(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<LogWatchRequest>,
) -> Result<(StatusCode, Json<WatchEntryResponse>), ApiError> {
    let user_id = match req.user_id {
        Some(id) if !id.is_empty() => {
            if !claims.owns(&id) && !claims.is_admin() {
                return Err(ApiError::AuthorizationError(
                    "Cannot log history for another user".to_string(),
                ));
            }
            id
        }
        _ => claims.sub.clone(),
    };

    let event = state
        .events
        .find(event_id)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

    let entry = WatchEntry::log(user_id, &event, req.duration);
    state.history.append(&entry).await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /history/me/{user_id}
pub async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WatchEntryResponse>>, ApiError> {
    if !claims.owns(&user_id) && !claims.is_admin() {
        return Err(ApiError::AuthorizationError(
            "Cannot view another user's history".to_string(),
        ));
    }

    let entries = state.history.list_for_user(&user_id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
