use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use paydesk::{
    config::Config,
    handlers::*,
    middleware::create_rate_limit_layer,
    services::*,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting paydesk v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize services
    let breaker = Arc::new(CircuitBreaker::new(
        "student-directory",
        BreakerConfig {
            failure_threshold: config.breaker_failure_threshold,
            failure_window: config.breaker_failure_window,
            open_cooldown: config.breaker_open_cooldown,
            half_open_successes: config.breaker_half_open_successes,
        },
    ));
    let directory = Arc::new(StudentDirectoryClient::new(
        config.student_directory_url.clone(),
        config.lookup_timeout,
        breaker,
    )?);
    let store = Arc::new(InMemoryReceiptStore::new());
    let receipts = Arc::new(ReceiptService::new(directory.clone(), store.clone()));

    // Build application state
    let app_state = AppState { receipts };

    let health_state = HealthState {
        directory: directory.clone(),
        store: store.clone(),
        started_at: Instant::now(),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(health_state)
        .route("/receipts", post(record_receipt))
        .route("/receipts/:student_id", get(get_latest_receipt))
        .with_state(app_state)
        // Global middleware
        .layer(create_rate_limit_layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
