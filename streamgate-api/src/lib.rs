use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod access;
pub mod content;
pub mod error;
pub mod events;
pub mod history;
pub mod middleware;
pub mod state;
pub mod stream;
pub mod tickets;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Catalog browsing and platform content need no token
    let public = Router::new()
        .route("/health", get(health))
        .route("/events", get(events::list_events))
        .route("/events/{event_id}", get(events::get_event))
        .route("/content", get(content::get_content));

    let authenticated = Router::new()
        .route("/events", post(events::create_event))
        .route(
            "/events/{event_id}",
            put(events::update_event).delete(events::delete_event),
        )
        .route("/events/{event_id}/tickets", post(tickets::purchase_ticket))
        .route(
            "/events/{event_id}/access/{user_id}",
            get(access::check_access),
        )
        .route("/events/{event_id}/stream", get(stream::event_stream))
        .route("/tickets/me/{user_id}", get(tickets::list_user_tickets))
        .route("/users/me", get(users::get_me))
        .route(
            "/users/me/{user_id}",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/history/me/{user_id}", get(history::list_history))
        .route("/history/{event_id}", post(history::log_watched))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let admin = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{user_id}/role", patch(users::update_role))
        .route("/content", put(content::update_content))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    // ConnectInfo is absent when the router is driven without a TCP listener,
    // e.g. in tests; those callers share one bucket.
    let ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(&key, state.rate_limit.requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
        )),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
