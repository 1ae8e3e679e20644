use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use streamgate_core::content::ContentSettings;
use streamgate_core::error::TicketingError;
use streamgate_core::event::Event;
use streamgate_core::history::WatchEntry;
use streamgate_core::repository::{
    ContentRepository, EventFilter, EventRepository, HistoryRepository, TicketRepository,
    UserRepository,
};
use streamgate_core::ticket::{Ticket, TicketStatus};
use streamgate_core::user::{Role, UserProfile};

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    tickets: HashMap<Uuid, Ticket>,
    users: HashMap<String, UserProfile>,
    history: Vec<WatchEntry>,
    content: Option<ContentSettings>,
    fail_commits: bool,
}

/// In-memory implementation of every repository trait.
///
/// One mutex guards all aggregates, so `commit_purchase` gets the same
/// all-or-nothing critical section the Postgres transaction provides. Backs
/// the test suites and dependency-free local runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent purchase commits fail with `Unavailable` before any
    /// write, for exercising rollback paths in tests.
    pub fn fail_purchase_commits(&self, fail: bool) {
        self.lock().fail_commits = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert(&self, event: &Event) -> Result<(), TicketingError> {
        self.lock().events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, TicketingError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, TicketingError> {
        let inner = self.lock();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| {
                filter
                    .creator_id
                    .as_ref()
                    .map(|c| &e.creator_id == c)
                    .unwrap_or(true)
                    && filter.status.map(|s| e.status == s).unwrap_or(true)
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn update(&self, event: &Event) -> Result<(), TicketingError> {
        let mut inner = self.lock();
        match inner.events.get_mut(&event.id) {
            Some(existing) => {
                // Same predicate as the SQL update: the shrink bound is
                // checked against the live counter, and a rejected edit
                // applies nothing.
                if event.total_tickets < existing.sold_tickets {
                    return Err(TicketingError::InvalidInput(format!(
                        "totalTickets cannot drop below the {} tickets already sold",
                        existing.sold_tickets
                    )));
                }
                existing.title = event.title.clone();
                existing.description = event.description.clone();
                existing.date = event.date.clone();
                existing.time = event.time.clone();
                existing.price = event.price;
                existing.total_tickets = event.total_tickets;
                existing.status = event.status;
                existing.category = event.category.clone();
                existing.stream_url = event.stream_url.clone();
                existing.updated_at = Utc::now();
                Ok(())
            }
            None => Err(TicketingError::NotFound(format!(
                "Event {} not found",
                event.id
            ))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TicketingError> {
        Ok(self.lock().events.remove(&id).is_some())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn commit_purchase(&self, ticket: &Ticket) -> Result<(), TicketingError> {
        let mut inner = self.lock();

        if inner.fail_commits {
            return Err(TicketingError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        // Same order as the SQL transaction: capacity gate, uniqueness
        // re-check, then both writes, all inside one critical section.
        let (sold, total) = match inner.events.get(&ticket.event_id) {
            Some(event) => (event.sold_tickets, event.total_tickets),
            None => {
                return Err(TicketingError::NotFound(format!(
                    "Event {} not found",
                    ticket.event_id
                )))
            }
        };
        if sold >= total {
            return Err(TicketingError::SoldOut);
        }

        let duplicate = inner.tickets.values().any(|t| {
            t.user_id == ticket.user_id
                && t.event_id == ticket.event_id
                && t.status == TicketStatus::Active
        });
        if duplicate {
            return Err(TicketingError::DuplicatePurchase);
        }

        inner.tickets.insert(ticket.id, ticket.clone());
        if let Some(event) = inner.events.get_mut(&ticket.event_id) {
            event.sold_tickets += 1;
            event.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: &str,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, TicketingError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .find(|t| {
                t.user_id == user_id && t.event_id == event_id && t.status == TicketStatus::Active
            })
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Ticket>, TicketingError> {
        let mut tickets: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(tickets)
    }

    async fn count_active_for_event(&self, event_id: Uuid) -> Result<i64, TicketingError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .filter(|t| t.event_id == event_id && t.status == TicketStatus::Active)
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert(&self, profile: &UserProfile) -> Result<UserProfile, TicketingError> {
        let mut inner = self.lock();
        let stored = match inner.users.get_mut(&profile.id) {
            Some(existing) => {
                existing.name = profile.name.clone();
                existing.email = profile.email.clone();
                existing.country = profile.country.clone();
                existing.city = profile.city.clone();
                existing.clone()
            }
            None => {
                inner.users.insert(profile.id.clone(), profile.clone());
                profile.clone()
            }
        };
        Ok(stored)
    }

    async fn find(&self, id: &str) -> Result<Option<UserProfile>, TicketingError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<UserProfile>, TicketingError> {
        let mut users: Vec<UserProfile> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn set_role(&self, id: &str, role: Role) -> Result<Option<UserProfile>, TicketingError> {
        let mut inner = self.lock();
        Ok(inner.users.get_mut(id).map(|profile| {
            profile.role = role;
            profile.clone()
        }))
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn append(&self, entry: &WatchEntry) -> Result<(), TicketingError> {
        self.lock().history.push(entry.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<WatchEntry>, TicketingError> {
        let mut entries: Vec<WatchEntry> = self
            .lock()
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(entries)
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn get(&self) -> Result<Option<ContentSettings>, TicketingError> {
        Ok(self.lock().content.clone())
    }

    async fn put(&self, settings: &ContentSettings) -> Result<(), TicketingError> {
        self.lock().content = Some(settings.clone());
        Ok(())
    }
}
