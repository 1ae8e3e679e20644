use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streamgate_core::content::ContentSettings;
use streamgate_core::error::TicketingError;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub platform_name: String,
    #[serde(default)]
    pub platform_description: String,
    pub homepage_banner: Option<String>,
    pub featured_event_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub platform_name: String,
    pub platform_description: String,
    pub homepage_banner: Option<String>,
    pub featured_event_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentSettings> for ContentResponse {
    fn from(settings: ContentSettings) -> Self {
        Self {
            platform_name: settings.platform_name,
            platform_description: settings.platform_description,
            homepage_banner: settings.homepage_banner,
            featured_event_id: settings.featured_event_id,
            updated_at: settings.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /content
/// Public platform presentation settings; null until an admin sets them.
pub async fn get_content(
    State(state): State<AppState>,
) -> Result<Json<Option<ContentResponse>>, ApiError> {
    let settings = state.content.get().await?;
    Ok(Json(settings.map(Into::into)))
}

/// PUT /content
/// Admin only (enforced by the route's middleware).
pub async fn update_content(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    if req.platform_name.trim().is_empty() {
        return Err(TicketingError::InvalidInput("platformName is required".to_string()).into());
    }

    let settings = ContentSettings {
        platform_name: req.platform_name,
        platform_description: req.platform_description,
        homepage_banner: req.homepage_banner,
        featured_event_id: req.featured_event_id,
        updated_at: Utc::now(),
    };

    state.content.put(&settings).await?;
    tracing::info!("Platform content updated by {}", claims.sub);

    Ok(Json(settings.into()))
}
