use std::net::SocketAddr;
use std::sync::Arc;

use streamgate_api::{
    app,
    state::{AppState, AuthConfig, RateLimitSettings},
};
use streamgate_core::access::AccessChecker;
use streamgate_core::purchase::PurchaseCoordinator;
use streamgate_core::repository::{
    ContentRepository, EventRepository, HistoryRepository, TicketRepository, UserRepository,
};
use streamgate_store::content_repo::PgContentRepository;
use streamgate_store::event_repo::PgEventRepository;
use streamgate_store::history_repo::PgHistoryRepository;
use streamgate_store::ticket_repo::PgTicketRepository;
use streamgate_store::user_repo::PgUserRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "streamgate_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = streamgate_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Streamgate API on port {}", config.server.port);

    // Postgres Connection + Migrations
    let db = streamgate_store::DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis_client =
        streamgate_store::RedisClient::new(&config.redis.url).expect("Invalid Redis URL");
    let redis_arc = Arc::new(redis_client);

    // SSE Broadcast Channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let events: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(db.pool.clone()));
    let tickets: Arc<dyn TicketRepository> = Arc::new(PgTicketRepository::new(db.pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.pool.clone()));
    let history: Arc<dyn HistoryRepository> = Arc::new(PgHistoryRepository::new(db.pool.clone()));
    let content: Arc<dyn ContentRepository> = Arc::new(PgContentRepository::new(db.pool.clone()));

    let app_state = AppState {
        coordinator: PurchaseCoordinator::new(events.clone(), tickets.clone()),
        access: AccessChecker::new(events.clone(), tickets.clone()),
        events,
        tickets,
        users,
        history,
        content,
        redis: redis_arc,
        sse_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        rate_limit: RateLimitSettings {
            requests: config.rate_limit.requests,
            window_seconds: config.rate_limit.window_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
