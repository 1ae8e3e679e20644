use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use streamgate_core::content::ContentSettings;
use streamgate_core::error::TicketingError;
use streamgate_core::repository::ContentRepository;

use crate::storage_error;

pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    platform_name: String,
    platform_description: String,
    homepage_banner: Option<String>,
    featured_event_id: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl From<ContentRow> for ContentSettings {
    fn from(row: ContentRow) -> Self {
        ContentSettings {
            platform_name: row.platform_name,
            platform_description: row.platform_description,
            homepage_banner: row.homepage_banner,
            featured_event_id: row.featured_event_id,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn get(&self) -> Result<Option<ContentSettings>, TicketingError> {
        let row = sqlx::query_as::<_, ContentRow>(
            "SELECT platform_name, platform_description, homepage_banner, featured_event_id, \
             updated_at FROM content_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(ContentSettings::from))
    }

    async fn put(&self, settings: &ContentSettings) -> Result<(), TicketingError> {
        sqlx::query(
            "INSERT INTO content_settings (id, platform_name, platform_description, \
             homepage_banner, featured_event_id, updated_at) \
             VALUES (1, $1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET platform_name = EXCLUDED.platform_name, \
             platform_description = EXCLUDED.platform_description, \
             homepage_banner = EXCLUDED.homepage_banner, \
             featured_event_id = EXCLUDED.featured_event_id, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(&settings.platform_name)
        .bind(&settings.platform_description)
        .bind(&settings.homepage_banner)
        .bind(settings.featured_event_id)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}
