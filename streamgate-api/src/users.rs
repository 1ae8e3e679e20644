use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use streamgate_core::error::TicketingError;
use streamgate_core::user::{Role, UserProfile};

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub country: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            country: profile.country,
            city: profile.city,
            role: profile.role,
            created_at: profile.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /users/me
/// Profile of the authenticated subject.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, ApiError> {
    let profile = state
        .users
        .find(&claims.sub)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("User {} not found", claims.sub)))?;

    Ok(Json(profile.into()))
}

/// GET /users/me/{user_id}
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if !claims.owns(&user_id) && !claims.is_admin() {
        return Err(ApiError::AuthorizationError(
            "Cannot view another user's profile".to_string(),
        ));
    }

    let profile = state
        .users
        .find(&user_id)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(profile.into()))
}

/// PUT /users/me/{user_id}
/// Create or update the profile for an authenticated identity. Roles are not
/// editable here; the upsert preserves whatever role the store already has.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !claims.owns(&user_id) && !claims.is_admin() {
        return Err(ApiError::AuthorizationError(
            "Cannot edit another user's profile".to_string(),
        ));
    }

    if req.name.trim().is_empty() {
        return Err(TicketingError::InvalidInput("name is required".to_string()).into());
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(TicketingError::InvalidInput("a valid email is required".to_string()).into());
    }

    let mut profile = UserProfile::new(user_id, req.name, req.email);
    profile.country = req.country;
    profile.city = req.city;

    let stored = state.users.upsert(&profile).await?;
    Ok(Json(stored.into()))
}

/// GET /users
/// Admin only (enforced by the route's middleware).
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// PATCH /users/{user_id}/role
/// Admin only. Changes the stored platform role.
pub async fn update_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = req
        .role
        .parse::<Role>()
        .map_err(TicketingError::InvalidInput)?;

    let updated = state
        .users
        .set_role(&user_id, role)
        .await?
        .ok_or_else(|| TicketingError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!("Role of {} set to {} by {}", user_id, role, claims.sub);
    Ok(Json(updated.into()))
}
