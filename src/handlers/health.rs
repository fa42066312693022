use crate::{app::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let replay_ok = state.gate.replay().ping().await;
    let chains = state.gate.verifier().registry().snapshot().await.len();

    let status = if chains > 0 && replay_ok {
        "healthy"
    } else if chains > 0 {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chains,
        replay_store: replay_ok,
        uptime_seconds: state.analytics.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
