use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::live::TicketPurchasedEvent;
use streamgate_core::purchase::PurchaseRequest;
use streamgate_core::ticket::{Ticket, TicketStatus};

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicketRequest {
    pub user_id: Option<String>,
    pub price: Option<Decimal>,
    pub event_title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub user_id: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub qr_code: String,
    pub purchased_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            user_id: ticket.user_id,
            event_id: ticket.event_id,
            event_title: ticket.event_title,
            price: ticket.price,
            status: ticket.status,
            qr_code: ticket.qr_code,
            purchased_at: ticket.purchased_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /events/{event_id}/tickets
/// Purchase one ticket. The coordinator owns all ordering and consistency
/// rules; this handler only authorizes the caller and shapes the response.
pub async fn purchase_ticket(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
    payload: Result<Json<PurchaseTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    // 1. A body that does not decode is invalid input, not a transport error
    let Json(req) = payload
        .map_err(|rejection| TicketingError::InvalidInput(rejection.body_text()))?;

    // 2. The token subject is the purchaser; buying for someone else is
    //    reserved for admins
    if let Some(user_id) = &req.user_id {
        if !user_id.is_empty() && !claims.owns(user_id) && !claims.is_admin() {
            return Err(ApiError::AuthorizationError(
                "Cannot purchase a ticket for another user".to_string(),
            ));
        }
    }

    let purchase = PurchaseRequest {
        user_id: req.user_id.unwrap_or_default(),
        claimed_price: req.price,
        claimed_title: req.event_title,
    };

    // 3. Validate, precheck, and commit atomically
    let ticket = state.coordinator.purchase(event_id, &purchase).await?;

    // 4. Feed the live availability stream; nobody listening is fine
    if let Ok(Some(event)) = state.events.find(event_id).await {
        let _ = state.sse_tx.send(TicketPurchasedEvent {
            event_id,
            tickets_remaining: event.tickets_remaining(),
            purchased_at: ticket.purchased_at.timestamp(),
        });
    }

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// GET /tickets/me/{user_id}
pub async fn list_user_tickets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    if !claims.owns(&user_id) && !claims.is_admin() {
        return Err(ApiError::AuthorizationError(
            "Cannot view another user's tickets".to_string(),
        ));
    }

    let tickets = state.tickets.list_for_user(&user_id).await?;
    Ok(Json(tickets.into_iter().map(Into::into).collect()))
}
