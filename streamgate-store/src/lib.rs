pub mod app_config;
pub mod content_repo;
pub mod database;
pub mod event_repo;
pub mod history_repo;
pub mod memory;
pub mod redis_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use database::DbClient;
pub use memory::MemoryStore;
pub use redis_repo::RedisClient;

use streamgate_core::error::TicketingError;

/// Map transport-level sqlx failures onto the shared taxonomy. Connection
/// and pool problems are retryable `Unavailable`; everything else is an
/// internal fault.
pub(crate) fn storage_error(err: sqlx::Error) -> TicketingError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
            TicketingError::Unavailable(err.to_string())
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => TicketingError::Unavailable(err.to_string()),
        other => TicketingError::Internal(other.to_string()),
    }
}
