use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broadcast payload emitted after every successful purchase commit, consumed
/// by the live availability feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPurchasedEvent {
    pub event_id: Uuid,
    pub tickets_remaining: i32,
    pub purchased_at: i64,
}
