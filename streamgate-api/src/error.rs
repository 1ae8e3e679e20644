use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use streamgate_core::TicketingError;

#[derive(Debug)]
pub enum ApiError {
    Ticketing(TicketingError),
    AuthenticationError(String),
    AuthorizationError(String),
    Anyhow(anyhow::Error),
}

impl From<TicketingError> for ApiError {
    fn from(err: TicketingError) -> Self {
        Self::Ticketing(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            ApiError::Ticketing(err) => {
                let status = match err {
                    TicketingError::InvalidInput(_)
                    | TicketingError::DuplicatePurchase
                    | TicketingError::SoldOut => StatusCode::BAD_REQUEST,
                    TicketingError::NotFound(_) => StatusCode::NOT_FOUND,
                    TicketingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    TicketingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = err.code();
                let message = match err {
                    TicketingError::Internal(detail) => {
                        tracing::error!("Internal error: {}", detail);
                        "Internal Server Error".to_string()
                    }
                    TicketingError::Unavailable(detail) => {
                        tracing::warn!("Storage unavailable: {}", detail);
                        "Service temporarily unavailable".to_string()
                    }
                    other => other.to_string(),
                };
                (status, code, message)
            }
            ApiError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
