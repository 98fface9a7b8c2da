//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    engine_ready: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.engine.is_ready();
    Json(HealthResponse {
        status: if ready { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        engine_ready: ready,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
