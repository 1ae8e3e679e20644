use async_trait::async_trait;
use uuid::Uuid;

use crate::content::ContentSettings;
use crate::error::TicketingError;
use crate::event::{Event, EventStatus};
use crate::history::WatchEntry;
use crate::ticket::Ticket;
use crate::user::{Role, UserProfile};

/// Filter for event listings.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub creator_id: Option<String>,
    pub status: Option<EventStatus>,
}

/// Repository trait for event data access
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), TicketingError>;

    async fn find(&self, id: Uuid) -> Result<Option<Event>, TicketingError>;

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, TicketingError>;

    /// Persist the editable fields and refresh `updated_at`. `sold_tickets`,
    /// `creator_id`, and `created_at` are not writable through an edit; the
    /// sold counter moves only inside the purchase commit. A `total_tickets`
    /// below the sold count is rejected with `InvalidInput`, checked at
    /// write time against the live counter rather than the caller's read,
    /// and a rejected edit applies nothing.
    async fn update(&self, event: &Event) -> Result<(), TicketingError>;

    /// Returns false when no such event existed. Tickets referencing the
    /// event are left in place; they carry their own snapshots.
    async fn delete(&self, id: Uuid) -> Result<bool, TicketingError>;
}

/// Repository trait for ticket data access
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Atomically insert `ticket` and advance the event's sold counter.
    ///
    /// Both the capacity bound and the one-active-ticket-per-user rule are
    /// re-checked here against committed state, not against whatever the
    /// caller read earlier. Either both writes land or neither does; a
    /// failed commit leaves no trace.
    async fn commit_purchase(&self, ticket: &Ticket) -> Result<(), TicketingError>;

    async fn find_active(
        &self,
        user_id: &str,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, TicketingError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Ticket>, TicketingError>;

    async fn count_active_for_event(&self, event_id: Uuid) -> Result<i64, TicketingError>;
}

/// Repository trait for user profile data access
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the profile, or update its editable fields if it already
    /// exists. `role` and `created_at` are preserved on update; roles change
    /// only through `set_role`.
    async fn upsert(&self, profile: &UserProfile) -> Result<UserProfile, TicketingError>;

    async fn find(&self, id: &str) -> Result<Option<UserProfile>, TicketingError>;

    async fn list(&self) -> Result<Vec<UserProfile>, TicketingError>;

    async fn set_role(&self, id: &str, role: Role) -> Result<Option<UserProfile>, TicketingError>;
}

/// Repository trait for watch history data access
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, entry: &WatchEntry) -> Result<(), TicketingError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<WatchEntry>, TicketingError>;
}

/// Repository trait for the platform content singleton
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn get(&self) -> Result<Option<ContentSettings>, TicketingError>;

    async fn put(&self, settings: &ContentSettings) -> Result<(), TicketingError>;
}
