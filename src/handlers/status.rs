//! Engine status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::engine::features::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use crate::{AppResult, AppState};

#[derive(Serialize)]
pub struct EngineStatusResponse {
    pub ready: bool,

    pub heuristic_weight: f64,
    pub ml_weight: f64,
    pub calibration: f64,
    pub outcome_count: i64,

    pub tuning_enabled: bool,
    pub tuning_interval_sec: u64,

    pub feature_version: u8,
    pub feature_count: usize,
    pub feature_layout_hash: u32,
}

pub async fn get(State(state): State<AppState>) -> AppResult<Json<EngineStatusResponse>> {
    let weights = state.engine.weights();
    let outcome_count = state.engine.outcome_count().await?;

    Ok(Json(EngineStatusResponse {
        ready: state.engine.is_ready(),
        heuristic_weight: weights.heuristic,
        ml_weight: weights.ml,
        calibration: state.engine.calibration(),
        outcome_count,
        tuning_enabled: state.config.enable_tuning,
        tuning_interval_sec: state.config.tuning_interval_sec,
        feature_version: FEATURE_VERSION,
        feature_count: FEATURE_COUNT,
        feature_layout_hash: layout_hash(),
    }))
}
