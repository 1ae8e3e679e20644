use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ticket lifecycle status. Only `active` tickets grant access and count
/// against event capacity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Used,
    Expired,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::Used => "used",
            TicketStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TicketStatus::Active),
            "used" => Ok(TicketStatus::Used),
            "expired" => Ok(TicketStatus::Expired),
            other => Err(format!("Unknown ticket status: {}", other)),
        }
    }
}

/// Proof of purchase tying one user to one event.
///
/// `event_title` and `price` are snapshots taken at purchase time, so the
/// ticket stays meaningful even if the event is later edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub price: Decimal,
    pub status: TicketStatus,
    pub qr_code: String,
    pub purchased_at: DateTime<Utc>,
}

impl Ticket {
    /// Mint a new active ticket for a purchase.
    pub fn issue(user_id: String, event_id: Uuid, event_title: String, price: Decimal) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            user_id,
            event_id,
            event_title,
            price,
            status: TicketStatus::Active,
            qr_code: format!("SGTICKET-{}-{}", event_id.simple(), id.simple()),
            purchased_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_ticket_is_active() {
        let event_id = Uuid::new_v4();
        let ticket = Ticket::issue(
            "user-1".to_string(),
            event_id,
            "Jazz Night".to_string(),
            Decimal::from(25),
        );

        assert!(ticket.is_active());
        assert_eq!(ticket.event_id, event_id);
        assert_eq!(ticket.price, Decimal::from(25));
        assert!(ticket.qr_code.starts_with("SGTICKET-"));
        assert!(ticket.qr_code.contains(&event_id.simple().to_string()));
    }

    #[test]
    fn test_issued_tickets_get_distinct_codes() {
        let event_id = Uuid::new_v4();
        let a = Ticket::issue("u1".to_string(), event_id, "E".to_string(), Decimal::ZERO);
        let b = Ticket::issue("u2".to_string(), event_id, "E".to_string(), Decimal::ZERO);
        assert_ne!(a.id, b.id);
        assert_ne!(a.qr_code, b.qr_code);
    }
}
