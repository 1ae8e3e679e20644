use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::event::{Event, EventStatus};
use streamgate_core::repository::{EventFilter, EventRepository};

use crate::storage_error;

const SELECT_EVENT: &str = "SELECT id, title, description, event_date, event_time, price, \
     total_tickets, sold_tickets, status, creator_id, category, stream_url, created_at, updated_at \
     FROM events";

pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    event_date: String,
    event_time: String,
    price: Decimal,
    total_tickets: i32,
    sold_tickets: i32,
    status: String,
    creator_id: String,
    category: Option<String>,
    stream_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> Result<Event, TicketingError> {
        let status = self
            .status
            .parse::<EventStatus>()
            .map_err(TicketingError::Internal)?;
        Ok(Event {
            id: self.id,
            title: self.title,
            description: self.description,
            date: self.event_date,
            time: self.event_time,
            price: self.price,
            total_tickets: self.total_tickets,
            sold_tickets: self.sold_tickets,
            status,
            creator_id: self.creator_id,
            category: self.category,
            stream_url: self.stream_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), TicketingError> {
        sqlx::query(
            "INSERT INTO events (id, title, description, event_date, event_time, price, \
             total_tickets, sold_tickets, status, creator_id, category, stream_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.price)
        .bind(event.total_tickets)
        .bind(event.sold_tickets)
        .bind(event.status.as_str())
        .bind(&event.creator_id)
        .bind(&event.category)
        .bind(&event.stream_url)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, TicketingError> {
        let row = sqlx::query_as::<_, EventRow>(&format!("{} WHERE id = $1", SELECT_EVENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(EventRow::into_event).transpose()
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, TicketingError> {
        let order = "ORDER BY created_at DESC";
        let rows = match (&filter.creator_id, &filter.status) {
            (Some(creator), Some(status)) => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "{} WHERE creator_id = $1 AND status = $2 {}",
                    SELECT_EVENT, order
                ))
                .bind(creator)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            (Some(creator), None) => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "{} WHERE creator_id = $1 {}",
                    SELECT_EVENT, order
                ))
                .bind(creator)
                .fetch_all(&self.pool)
                .await
            }
            (None, Some(status)) => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "{} WHERE status = $1 {}",
                    SELECT_EVENT, order
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            (None, None) => {
                sqlx::query_as::<_, EventRow>(&format!("{} {}", SELECT_EVENT, order))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(storage_error)?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    async fn update(&self, event: &Event) -> Result<(), TicketingError> {
        // sold_tickets and creator_id are absent from the SET list; the
        // counter moves only inside commit_purchase, ownership never moves.
        // The sold_tickets predicate holds the shrink bound against the live
        // row, not against whatever the caller read before editing.
        let result = sqlx::query(
            "UPDATE events SET title = $2, description = $3, event_date = $4, event_time = $5, \
             price = $6, total_tickets = $7, status = $8, category = $9, stream_url = $10, \
             updated_at = NOW() \
             WHERE id = $1 AND sold_tickets <= $7",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.price)
        .bind(event.total_tickets)
        .bind(event.status.as_str())
        .bind(&event.category)
        .bind(&event.stream_url)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            // Zero rows is either a vanished event or a shrink below the
            // live sold count.
            let sold =
                sqlx::query_scalar::<_, i32>("SELECT sold_tickets FROM events WHERE id = $1")
                    .bind(event.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(storage_error)?;
            return match sold {
                None => Err(TicketingError::NotFound(format!(
                    "Event {} not found",
                    event.id
                ))),
                Some(sold) => Err(TicketingError::InvalidInput(format!(
                    "totalTickets cannot drop below the {} tickets already sold",
                    sold
                ))),
            };
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TicketingError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
