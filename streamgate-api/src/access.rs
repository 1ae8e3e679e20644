use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use streamgate_core::access::AccessDecision;
use streamgate_core::event::EventStatus;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::tickets::TicketResponse;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub has_access: bool,
    pub ticket: Option<TicketResponse>,
    pub event: EventAccessView,
}

/// Event metadata echoed with an access answer. `stream_url` appears only
/// when access was granted; a denial discloses nothing about the stream.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAccessView {
    pub id: Uuid,
    pub title: String,
    pub date: String,
    pub time: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /events/{event_id}/access/{user_id}
/// Does this user hold an active ticket for this event right now?
pub async fn check_access(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((event_id, user_id)): Path<(Uuid, String)>,
) -> Result<Json<AccessResponse>, ApiError> {
    if !claims.owns(&user_id) && !claims.is_admin() {
        return Err(ApiError::AuthorizationError(
            "Cannot check another user's access".to_string(),
        ));
    }

    let decision = state.access.check(&user_id, event_id).await?;

    let stream_url = decision.gated_stream_url().map(str::to_string);
    let AccessDecision {
        granted,
        ticket,
        event,
    } = decision;

    Ok(Json(AccessResponse {
        has_access: granted,
        ticket: ticket.map(Into::into),
        event: EventAccessView {
            id: event.id,
            title: event.title,
            date: event.date,
            time: event.time,
            status: event.status,
            stream_url,
        },
    }))
}
