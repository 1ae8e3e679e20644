use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// One watched-stream record in a user's viewing history.
///
/// Carries a title snapshot like tickets do, so history survives event edits
/// and deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    pub id: Uuid,
    pub user_id: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub duration: Option<String>,
    pub watched_at: DateTime<Utc>,
}

impl WatchEntry {
    pub fn log(user_id: String, event: &Event, duration: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id: event.id,
            event_title: event.title.clone(),
            duration,
            watched_at: Utc::now(),
        }
    }
}
