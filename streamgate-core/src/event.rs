use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Live,
    Past,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Live => "live",
            EventStatus::Past => "past",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "live" => Ok(EventStatus::Live),
            "past" => Ok(EventStatus::Past),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(format!("Unknown event status: {}", other)),
        }
    }
}

/// Input for creating an event. Field rules are enforced at the API
/// boundary before this struct is built.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: Decimal,
    pub total_tickets: i32,
    pub status: EventStatus,
    pub creator_id: String,
    pub category: Option<String>,
    pub stream_url: Option<String>,
}

/// A scheduled live stream with a finite ticket capacity.
///
/// `sold_tickets` is a denormalized counter over active tickets. It is only
/// ever advanced by the atomic purchase commit, which keeps it within
/// `0..=total_tickets` under any interleaving of buyers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: Decimal,
    pub total_tickets: i32,
    pub sold_tickets: i32,
    pub status: EventStatus,
    pub creator_id: String,
    pub category: Option<String>,
    pub stream_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with no tickets sold.
    pub fn new(draft: EventDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            price: draft.price,
            total_tickets: draft.total_tickets,
            sold_tickets: 0,
            status: draft.status,
            creator_id: draft.creator_id,
            category: draft.category,
            stream_url: draft.stream_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tickets_remaining(&self) -> i32 {
        (self.total_tickets - self.sold_tickets).max(0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.sold_tickets >= self.total_tickets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EventDraft {
        EventDraft {
            title: "Jazz Night".to_string(),
            description: "Late night session".to_string(),
            date: "2026-09-01".to_string(),
            time: "20:00".to_string(),
            price: Decimal::from(25),
            total_tickets: 100,
            status: EventStatus::Upcoming,
            creator_id: "creator-1".to_string(),
            category: Some("music".to_string()),
            stream_url: None,
        }
    }

    #[test]
    fn test_new_event_starts_with_zero_sold() {
        let event = Event::new(draft());
        assert_eq!(event.sold_tickets, 0);
        assert_eq!(event.tickets_remaining(), 100);
        assert!(!event.is_sold_out());
    }

    #[test]
    fn test_sold_out_at_capacity() {
        let mut event = Event::new(draft());
        event.sold_tickets = event.total_tickets;
        assert!(event.is_sold_out());
        assert_eq!(event.tickets_remaining(), 0);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            EventStatus::Upcoming,
            EventStatus::Live,
            EventStatus::Past,
            EventStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>(), Ok(status));
        }
        assert!("archived".parse::<EventStatus>().is_err());
    }
}
