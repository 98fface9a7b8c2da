//! Outcome Recorder
//!
//! Re-scores the supplied context under the weights in effect right now,
//! persists the outcome, and refreshes the cached calibration. Validation
//! happens before any write; a failed record leaves the store untouched.

use chrono::Utc;

use crate::engine::{features, Engine};
use crate::models::{DeploymentContext, DeploymentOutcome, NewOutcome};

#[derive(Debug)]
pub enum RecordError {
    Validation(String),
    Storage(sqlx::Error),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Validation(msg) => write!(f, "invalid outcome: {}", msg),
            RecordError::Storage(err) => write!(f, "outcome store error: {}", err),
        }
    }
}

impl std::error::Error for RecordError {}

pub(crate) async fn record(
    engine: &Engine,
    context: &DeploymentContext,
    actual_error_rate_percent: f64,
    actual_latency_change_percent: f64,
    rollback_triggered: bool,
) -> Result<DeploymentOutcome, RecordError> {
    context.validate().map_err(RecordError::Validation)?;

    if !actual_error_rate_percent.is_finite() || actual_error_rate_percent < 0.0 {
        return Err(RecordError::Validation(
            "actual_error_rate_percent must be a finite value >= 0".to_string(),
        ));
    }
    // Latency change may legitimately be negative (the deploy got faster)
    if !actual_latency_change_percent.is_finite() {
        return Err(RecordError::Validation(
            "actual_latency_change_percent must be a finite value".to_string(),
        ));
    }

    let assessment = engine.predict(context);
    let feature_vector = features::extract(context);

    let new = NewOutcome {
        deployment_id: context.deployment_id.clone(),
        heuristic_score: assessment.heuristic_score,
        ml_score: assessment.ml_score,
        final_score: assessment.risk_score,
        actual_error_rate_percent,
        actual_latency_change_percent,
        rollback_triggered,
        timestamp: Utc::now(),
        features: serde_json::to_string(&feature_vector).ok(),
    };

    let outcome = DeploymentOutcome::insert(engine.pool(), new)
        .await
        .map_err(RecordError::Storage)?;

    tracing::debug!(
        deployment_id = %outcome.deployment_id,
        final_score = outcome.final_score,
        rollback = outcome.rollback_triggered,
        "deployment outcome recorded"
    );

    if let Err(e) = DeploymentOutcome::evict_over_cap(engine.pool(), engine.retention_cap()).await {
        tracing::warn!("outcome eviction failed: {}", e);
    }
    if let Err(e) = engine.refresh_calibration().await {
        tracing::warn!("calibration refresh failed after record: {}", e);
    }

    Ok(outcome)
}
