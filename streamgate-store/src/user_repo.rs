use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use streamgate_core::error::TicketingError;
use streamgate_core::repository::UserRepository;
use streamgate_core::user::{Role, UserProfile};

use crate::storage_error;

const SELECT_USER: &str =
    "SELECT id, name, email, country, city, role, created_at FROM users";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    country: Option<String>,
    city: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_profile(self) -> Result<UserProfile, TicketingError> {
        let role = self.role.parse::<Role>().map_err(TicketingError::Internal)?;
        Ok(UserProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            country: self.country,
            city: self.city,
            role,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn upsert(&self, profile: &UserProfile) -> Result<UserProfile, TicketingError> {
        // Role and created_at stick to the stored row; profile edits cannot
        // escalate privileges.
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, country, city, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, \
             country = EXCLUDED.country, city = EXCLUDED.city \
             RETURNING id, name, email, country, city, role, created_at",
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.country)
        .bind(&profile.city)
        .bind(profile.role.as_str())
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        row.into_profile()
    }

    async fn find(&self, id: &str) -> Result<Option<UserProfile>, TicketingError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(UserRow::into_profile).transpose()
    }

    async fn list(&self) -> Result<Vec<UserProfile>, TicketingError> {
        let rows =
            sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY created_at DESC", SELECT_USER))
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;

        rows.into_iter().map(UserRow::into_profile).collect()
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<Option<UserProfile>, TicketingError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET role = $2 WHERE id = $1 \
             RETURNING id, name, email, country, city, role, created_at",
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(UserRow::into_profile).transpose()
    }
}
