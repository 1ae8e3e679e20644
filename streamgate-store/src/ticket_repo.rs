use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::repository::TicketRepository;
use streamgate_core::ticket::{Ticket, TicketStatus};

use crate::storage_error;

const SELECT_TICKET: &str = "SELECT id, user_id, event_id, event_title, price, status, qr_code, \
     purchased_at FROM tickets";

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: String,
    event_id: Uuid,
    event_title: String,
    price: Decimal,
    status: String,
    qr_code: String,
    purchased_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> Result<Ticket, TicketingError> {
        let status = self
            .status
            .parse::<TicketStatus>()
            .map_err(TicketingError::Internal)?;
        Ok(Ticket {
            id: self.id,
            user_id: self.user_id,
            event_id: self.event_id,
            event_title: self.event_title,
            price: self.price,
            status,
            qr_code: self.qr_code,
            purchased_at: self.purchased_at,
        })
    }
}

fn commit_error(err: sqlx::Error) -> TicketingError {
    // The partial unique index on active (user_id, event_id) pairs turns a
    // racing duplicate into a constraint violation at insert time.
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return TicketingError::DuplicatePurchase;
        }
    }
    storage_error(err)
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn commit_purchase(&self, ticket: &Ticket) -> Result<(), TicketingError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // Capacity gate. The WHERE clause re-checks the bound against current
        // committed state; a concurrent buyer who got here first makes this
        // match zero rows.
        let gate = sqlx::query(
            "UPDATE events SET sold_tickets = sold_tickets + 1, updated_at = NOW() \
             WHERE id = $1 AND sold_tickets < total_tickets",
        )
        .bind(ticket.event_id)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        if gate.rows_affected() == 0 {
            // Zero rows is either a full event or one deleted since the
            // caller resolved it.
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE id = $1")
                .bind(ticket.event_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error)?;
            tx.rollback().await.map_err(storage_error)?;
            return if exists == 0 {
                Err(TicketingError::NotFound(format!(
                    "Event {} not found",
                    ticket.event_id
                )))
            } else {
                Err(TicketingError::SoldOut)
            };
        }

        let inserted = sqlx::query(
            "INSERT INTO tickets (id, user_id, event_id, event_title, price, status, qr_code, purchased_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(ticket.id)
        .bind(&ticket.user_id)
        .bind(ticket.event_id)
        .bind(&ticket.event_title)
        .bind(ticket.price)
        .bind(ticket.status.as_str())
        .bind(&ticket.qr_code)
        .bind(ticket.purchased_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            // Rolling back undoes the counter increment with it.
            tx.rollback().await.map_err(storage_error)?;
            return Err(commit_error(err));
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: &str,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, TicketingError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "{} WHERE user_id = $1 AND event_id = $2 AND status = 'active'",
            SELECT_TICKET
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(TicketRow::into_ticket).transpose()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Ticket>, TicketingError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "{} WHERE user_id = $1 ORDER BY purchased_at DESC",
            SELECT_TICKET
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn count_active_for_event(&self, event_id: Uuid) -> Result<i64, TicketingError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE event_id = $1 AND status = 'active'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)
    }
}
