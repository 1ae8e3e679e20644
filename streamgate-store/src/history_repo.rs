use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use streamgate_core::error::TicketingError;
use streamgate_core::history::WatchEntry;
use streamgate_core::repository::HistoryRepository;

use crate::storage_error;

pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WatchRow {
    id: Uuid,
    user_id: String,
    event_id: Uuid,
    event_title: String,
    duration: Option<String>,
    watched_at: DateTime<Utc>,
}

impl From<WatchRow> for WatchEntry {
    fn from(row: WatchRow) -> Self {
        WatchEntry {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            event_title: row.event_title,
            duration: row.duration,
            watched_at: row.watched_at,
        }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn append(&self, entry: &WatchEntry) -> Result<(), TicketingError> {
        sqlx::query(
            "INSERT INTO watch_history (id, user_id, event_id, event_title, duration, watched_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(entry.event_id)
        .bind(&entry.event_title)
        .bind(&entry.duration)
        .bind(entry.watched_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<WatchEntry>, TicketingError> {
        let rows = sqlx::query_as::<_, WatchRow>(
            "SELECT id, user_id, event_id, event_title, duration, watched_at \
             FROM watch_history WHERE user_id = $1 ORDER BY watched_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(WatchEntry::from).collect())
    }
}
