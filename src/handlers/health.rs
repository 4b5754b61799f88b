use crate::{
    models::HealthStatus,
    services::{BreakerState, InMemoryReceiptStore, StudentDirectoryClient},
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct HealthState {
    pub directory: Arc<StudentDirectoryClient>,
    pub store: Arc<InMemoryReceiptStore>,
    pub started_at: Instant,
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthStatus> {
    let breaker = state.directory.breaker_state();

    let status = match breaker {
        BreakerState::Closed => "healthy",
        BreakerState::HalfOpen => "degraded",
        BreakerState::Open => "unhealthy",
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        directory_breaker: breaker.as_str().to_string(),
        receipts_stored: state.store.count().await,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
