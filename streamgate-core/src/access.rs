use std::sync::Arc;

use uuid::Uuid;

use crate::error::TicketingError;
use crate::event::Event;
use crate::repository::{EventRepository, TicketRepository};
use crate::ticket::Ticket;

/// Outcome of an access check: whether the user currently holds an active
/// ticket for the event, plus what was found along the way.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub granted: bool,
    pub ticket: Option<Ticket>,
    pub event: Event,
}

impl AccessDecision {
    /// The gated stream locator. Disclosed only with a grant; a denied check
    /// never learns where the stream lives.
    pub fn gated_stream_url(&self) -> Option<&str> {
        if self.granted {
            self.event.stream_url.as_deref()
        } else {
            None
        }
    }
}

/// Answers "may this user watch this event right now" from committed state.
///
/// Pure read path: no locks, no writes, safe to call at any frequency.
#[derive(Clone)]
pub struct AccessChecker {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl AccessChecker {
    pub fn new(events: Arc<dyn EventRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { events, tickets }
    }

    pub async fn check(
        &self,
        user_id: &str,
        event_id: Uuid,
    ) -> Result<AccessDecision, TicketingError> {
        if user_id.trim().is_empty() {
            return Err(TicketingError::InvalidInput("userId is required".to_string()));
        }

        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

        // Only an active ticket grants access; used and expired ones do not.
        let ticket = self.tickets.find_active(user_id, event_id).await?;

        Ok(AccessDecision {
            granted: ticket.is_some(),
            ticket,
            event,
        })
    }
}
