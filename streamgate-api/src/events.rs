use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::event::{Event, EventDraft, EventStatus};
use streamgate_core::repository::EventFilter;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub creator_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: Decimal,
    pub total_tickets: i32,
    pub status: Option<String>,
    pub category: Option<String>,
    pub stream_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub price: Option<Decimal>,
    pub total_tickets: Option<i32>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub stream_url: Option<String>,
}

/// Public projection of an event. `stream_url` is the gated resource: it is
/// serialized only for the event's owner (and admins), never on the public
/// catalog. Viewers obtain it through the access endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: Decimal,
    pub total_tickets: i32,
    pub sold_tickets: i32,
    pub tickets_remaining: i32,
    pub status: EventStatus,
    pub creator_id: String,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn from_event(event: Event, include_stream_url: bool) -> Self {
        let tickets_remaining = event.tickets_remaining();
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            price: event.price,
            total_tickets: event.total_tickets,
            sold_tickets: event.sold_tickets,
            tickets_remaining,
            status: event.status,
            creator_id: event.creator_id,
            category: event.category,
            stream_url: if include_stream_url {
                event.stream_url
            } else {
                None
            },
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

fn parse_status(s: &str) -> Result<EventStatus, ApiError> {
    s.parse::<EventStatus>()
        .map_err(|e| TicketingError::InvalidInput(e).into())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /events
/// Public catalog listing, optionally filtered by creator and status.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let status = match &query.status {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let filter = EventFilter {
        creator_id: query.creator_id,
        status,
    };

    let events = state.events.list(&filter).await?;
    Ok(Json(
        events
            .into_iter()
            .map(|e| EventResponse::from_event(e, false))
            .collect(),
    ))
}

/// GET /events/{event_id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state
        .events
        .find(event_id)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

    Ok(Json(EventResponse::from_event(event, false)))
}

/// POST /events
/// Publish a new event. Requires the creator or admin role.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    if !claims.can_publish() {
        return Err(ApiError::AuthorizationError(
            "Creator role required".to_string(),
        ));
    }

    // 1. Validate the payload at the boundary
    if req.title.trim().is_empty() {
        return Err(TicketingError::InvalidInput("title is required".to_string()).into());
    }
    if req.date.trim().is_empty() || req.time.trim().is_empty() {
        return Err(TicketingError::InvalidInput("date and time are required".to_string()).into());
    }
    if req.total_tickets < 1 {
        return Err(
            TicketingError::InvalidInput("totalTickets must be at least 1".to_string()).into(),
        );
    }
    if req.price.is_sign_negative() {
        return Err(
            TicketingError::InvalidInput("price must be non-negative".to_string()).into(),
        );
    }
    let status = match &req.status {
        Some(s) => parse_status(s)?,
        None => EventStatus::Upcoming,
    };

    // 2. The token subject owns the event; the body cannot claim otherwise
    let event = Event::new(EventDraft {
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        price: req.price,
        total_tickets: req.total_tickets,
        status,
        creator_id: claims.sub.clone(),
        category: req.category,
        stream_url: req.stream_url,
    });

    state.events.insert(&event).await?;
    tracing::info!("Event {} created by {}", event.id, claims.sub);

    Ok((StatusCode::CREATED, Json(EventResponse::from_event(event, true))))
}

/// PUT /events/{event_id}
/// Edit an event. Only the owning creator or an admin may edit, and the sold
/// counter is not editable through this endpoint.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    // 1. Load and authorize
    let mut event = state
        .events
        .find(event_id)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

    if !claims.is_admin() && !claims.owns(&event.creator_id) {
        return Err(ApiError::AuthorizationError(
            "Only the event creator may edit it".to_string(),
        ));
    }

    // 2. Apply the patch field by field
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(TicketingError::InvalidInput("title cannot be empty".to_string()).into());
        }
        event.title = title;
    }
    if let Some(description) = req.description {
        event.description = description;
    }
    if let Some(date) = req.date {
        event.date = date;
    }
    if let Some(time) = req.time {
        event.time = time;
    }
    if let Some(price) = req.price {
        if price.is_sign_negative() {
            return Err(
                TicketingError::InvalidInput("price must be non-negative".to_string()).into(),
            );
        }
        event.price = price;
    }
    if let Some(total) = req.total_tickets {
        // Capacity may grow or shrink, but never below what is already sold.
        // This check fails fast; the store re-checks the bound against the
        // live counter when it applies the edit.
        if total < 1 {
            return Err(TicketingError::InvalidInput(
                "totalTickets must be at least 1".to_string(),
            )
            .into());
        }
        if total < event.sold_tickets {
            return Err(TicketingError::InvalidInput(format!(
                "totalTickets cannot drop below the {} tickets already sold",
                event.sold_tickets
            ))
            .into());
        }
        event.total_tickets = total;
    }
    if let Some(status) = req.status {
        event.status = parse_status(&status)?;
    }
    if let Some(category) = req.category {
        event.category = Some(category);
    }
    if let Some(stream_url) = req.stream_url {
        event.stream_url = Some(stream_url);
    }
    event.updated_at = Utc::now();

    // 3. Persist (sold_tickets stays whatever the store has)
    state.events.update(&event).await?;
    tracing::info!("Event {} updated by {}", event.id, claims.sub);

    Ok(Json(EventResponse::from_event(event, true)))
}

/// DELETE /events/{event_id}
/// Remove an event. Existing tickets keep their snapshots and are untouched.
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = state
        .events
        .find(event_id)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

    if !claims.is_admin() && !claims.owns(&event.creator_id) {
        return Err(ApiError::AuthorizationError(
            "Only the event creator may delete it".to_string(),
        ));
    }

    let deleted = state.events.delete(event_id).await?;
    if !deleted {
        return Err(TicketingError::NotFound(format!("Event {} not found", event_id)).into());
    }
    tracing::info!("Event {} deleted by {}", event_id, claims.sub);

    Ok(Json(json!({
        "message": "Event deleted",
        "id": event_id,
    })))
}
