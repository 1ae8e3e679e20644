use std::sync::Arc;

use tokio::sync::broadcast;

use streamgate_core::access::AccessChecker;
use streamgate_core::live::TicketPurchasedEvent;
use streamgate_core::purchase::PurchaseCoordinator;
use streamgate_core::repository::{
    ContentRepository, EventRepository, HistoryRepository, TicketRepository, UserRepository,
};
use streamgate_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct RateLimitSettings {
    pub requests: i64,
    pub window_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub users: Arc<dyn UserRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub coordinator: PurchaseCoordinator,
    pub access: AccessChecker,
    pub redis: Arc<RedisClient>,
    pub sse_tx: broadcast::Sender<TicketPurchasedEvent>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitSettings,
}
