use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::TicketingError;
use crate::event::Event;
use crate::repository::{EventRepository, TicketRepository};
use crate::ticket::Ticket;

/// A purchase attempt as submitted by the client, after the transport layer
/// has decoded it. Everything in here is still untrusted.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub user_id: String,
    pub claimed_price: Option<Decimal>,
    pub claimed_title: Option<String>,
}

/// Coordinates ticket purchases against the event catalog and ticket store.
///
/// The coordinator is stateless. It validates, prechecks, and mints the
/// ticket, then hands the only mutation to `TicketRepository::commit_purchase`,
/// which re-verifies capacity and uniqueness atomically. The prechecks here
/// exist to fail fast with a precise error; they are not what makes the
/// system correct under concurrency.
#[derive(Clone)]
pub struct PurchaseCoordinator {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl PurchaseCoordinator {
    pub fn new(events: Arc<dyn EventRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { events, tickets }
    }

    /// Purchase one ticket for `event_id` on behalf of `req.user_id`.
    ///
    /// Checks run in a fixed order before any write: event resolution,
    /// request validation, duplicate guard, capacity. A request that fails
    /// any of them leaves the stores untouched.
    pub async fn purchase(
        &self,
        event_id: Uuid,
        req: &PurchaseRequest,
    ) -> Result<Ticket, TicketingError> {
        // 1. Resolve the event
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| TicketingError::NotFound(format!("Event {} not found", event_id)))?;

        // 2. Validate the request
        Self::validate(req)?;

        // 3. Duplicate guard. Racing duplicates that slip past this read are
        //    caught again inside the commit.
        if self
            .tickets
            .find_active(&req.user_id, event_id)
            .await?
            .is_some()
        {
            return Err(TicketingError::DuplicatePurchase);
        }

        // 4. Capacity precheck, also re-verified at commit time
        if event.is_sold_out() {
            return Err(TicketingError::SoldOut);
        }

        let price = Self::authoritative_price(&event, req);
        let title = req
            .claimed_title
            .clone()
            .unwrap_or_else(|| event.title.clone());

        let ticket = Ticket::issue(req.user_id.clone(), event_id, title, price);

        // 5. Single atomic mutation
        self.tickets.commit_purchase(&ticket).await?;

        info!(
            "Ticket {} issued for event {} to user {}",
            ticket.id, event_id, req.user_id
        );
        Ok(ticket)
    }

    fn validate(req: &PurchaseRequest) -> Result<(), TicketingError> {
        if req.user_id.trim().is_empty() {
            return Err(TicketingError::InvalidInput("userId is required".to_string()));
        }
        match req.claimed_price {
            None => {
                return Err(TicketingError::InvalidInput("price is required".to_string()));
            }
            Some(price) if price.is_sign_negative() => {
                return Err(TicketingError::InvalidInput(
                    "price must be non-negative".to_string(),
                ));
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// The event record owns the price. A divergent claim means a stale or
    /// tampering client; it is logged and ignored, never honored.
    fn authoritative_price(event: &Event, req: &PurchaseRequest) -> Decimal {
        if let Some(claimed) = req.claimed_price {
            if claimed != event.price {
                warn!(
                    "Claimed price {} diverges from event price {} for event {}",
                    claimed, event.price, event.id
                );
            }
        }
        event.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventStatus};
    use crate::repository::EventFilter;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubEvents {
        event: Option<Event>,
    }

    #[async_trait]
    impl EventRepository for StubEvents {
        async fn insert(&self, _event: &Event) -> Result<(), TicketingError> {
            Ok(())
        }

        async fn find(&self, id: Uuid) -> Result<Option<Event>, TicketingError> {
            Ok(self.event.clone().filter(|e| e.id == id))
        }

        async fn list(&self, _filter: &EventFilter) -> Result<Vec<Event>, TicketingError> {
            Ok(self.event.clone().into_iter().collect())
        }

        async fn update(&self, _event: &Event) -> Result<(), TicketingError> {
            Ok(())
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, TicketingError> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct StubTickets {
        existing_active: Option<Ticket>,
        committed: Mutex<Vec<Ticket>>,
        fail_commit_with: Option<fn() -> TicketingError>,
    }

    #[async_trait]
    impl TicketRepository for StubTickets {
        async fn commit_purchase(&self, ticket: &Ticket) -> Result<(), TicketingError> {
            if let Some(fail) = self.fail_commit_with {
                return Err(fail());
            }
            self.committed.lock().unwrap().push(ticket.clone());
            Ok(())
        }

        async fn find_active(
            &self,
            user_id: &str,
            event_id: Uuid,
        ) -> Result<Option<Ticket>, TicketingError> {
            Ok(self
                .existing_active
                .clone()
                .filter(|t| t.user_id == user_id && t.event_id == event_id))
        }

        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<Ticket>, TicketingError> {
            Ok(Vec::new())
        }

        async fn count_active_for_event(&self, _event_id: Uuid) -> Result<i64, TicketingError> {
            Ok(self.committed.lock().unwrap().len() as i64)
        }
    }

    fn event_with_price(price: Decimal) -> Event {
        Event::new(EventDraft {
            title: "Jazz Night".to_string(),
            description: String::new(),
            date: "2026-09-01".to_string(),
            time: "20:00".to_string(),
            price,
            total_tickets: 10,
            status: EventStatus::Upcoming,
            creator_id: "creator-1".to_string(),
            category: None,
            stream_url: None,
        })
    }

    fn coordinator(
        event: Option<Event>,
        tickets: StubTickets,
    ) -> (PurchaseCoordinator, Arc<StubTickets>) {
        let tickets = Arc::new(tickets);
        let coordinator =
            PurchaseCoordinator::new(Arc::new(StubEvents { event }), tickets.clone());
        (coordinator, tickets)
    }

    fn request(user_id: &str, price: Option<Decimal>) -> PurchaseRequest {
        PurchaseRequest {
            user_id: user_id.to_string(),
            claimed_price: price,
            claimed_title: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_event_is_checked_before_input() {
        let (coordinator, tickets) = coordinator(None, StubTickets::default());

        // Bad input too, but event resolution comes first.
        let err = coordinator
            .purchase(Uuid::new_v4(), &request("", None))
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::NotFound(_)));
        assert!(tickets.committed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_user_id_is_rejected() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let (coordinator, tickets) = coordinator(Some(event), StubTickets::default());

        let err = coordinator
            .purchase(event_id, &request("   ", Some(Decimal::from(50))))
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::InvalidInput(_)));
        assert!(tickets.committed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_and_negative_price_are_rejected() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let (coordinator, _) = coordinator(Some(event), StubTickets::default());

        let missing = coordinator
            .purchase(event_id, &request("user-1", None))
            .await
            .unwrap_err();
        assert!(matches!(missing, TicketingError::InvalidInput(_)));

        let negative = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::from(-1))))
            .await
            .unwrap_err();
        assert!(matches!(negative, TicketingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_existing_active_ticket_blocks_purchase() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let existing = Ticket::issue(
            "user-1".to_string(),
            event_id,
            "Jazz Night".to_string(),
            Decimal::from(50),
        );
        let (coordinator, tickets) = coordinator(
            Some(event),
            StubTickets {
                existing_active: Some(existing),
                ..StubTickets::default()
            },
        );

        let err = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::from(50))))
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::DuplicatePurchase));
        assert!(tickets.committed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sold_out_event_blocks_purchase() {
        let mut event = event_with_price(Decimal::from(50));
        event.sold_tickets = event.total_tickets;
        let event_id = event.id;
        let (coordinator, tickets) = coordinator(Some(event), StubTickets::default());

        let err = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::from(50))))
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::SoldOut));
        assert!(tickets.committed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_price_overrides_claimed_price() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let (coordinator, tickets) = coordinator(Some(event), StubTickets::default());

        let ticket = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::ONE)))
            .await
            .unwrap();

        assert_eq!(ticket.price, Decimal::from(50));
        let committed = tickets.committed.lock().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].price, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_title_falls_back_to_event_title() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let (coordinator, _) = coordinator(Some(event), StubTickets::default());

        let ticket = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::from(50))))
            .await
            .unwrap();

        assert_eq!(ticket.event_title, "Jazz Night");
    }

    #[tokio::test]
    async fn test_commit_failure_propagates() {
        let event = event_with_price(Decimal::from(50));
        let event_id = event.id;
        let (coordinator, _) = coordinator(
            Some(event),
            StubTickets {
                fail_commit_with: Some(|| TicketingError::SoldOut),
                ..StubTickets::default()
            },
        );

        let err = coordinator
            .purchase(event_id, &request("user-1", Some(Decimal::from(50))))
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::SoldOut));
    }
}
