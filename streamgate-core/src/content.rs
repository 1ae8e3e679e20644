use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Singleton platform presentation settings, editable by admins only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSettings {
    pub platform_name: String,
    pub platform_description: String,
    pub homepage_banner: Option<String>,
    pub featured_event_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
