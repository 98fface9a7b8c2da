//! Deployment assessment handler

use std::time::Duration;

use axum::{extract::State, http::HeaderMap, Json};

use crate::models::{AssessResponse, DeploymentContext};
use crate::{AppError, AppResult, AppState};

/// Optional caller-supplied deadline in milliseconds
pub const TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Assess a deployment: risk score, confidence, and canary policy.
/// Pure relative to the current weights snapshot; nothing is persisted.
pub async fn assess(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(context): Json<DeploymentContext>,
) -> AppResult<Json<AssessResponse>> {
    context.validate().map_err(AppError::Validation)?;

    if !state.engine.is_ready() {
        return Err(AppError::NotReady);
    }

    let deadline_ms = headers
        .get(TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    tracing::info!(
        deployment_id = %context.deployment_id,
        service = %context.service_name,
        changes = context.changes.len(),
        "assessing deployment"
    );

    let response = match deadline_ms {
        Some(ms) => {
            let engine = state.engine.clone();
            let task = tokio::task::spawn_blocking(move || engine.assess(&context));
            match tokio::time::timeout(Duration::from_millis(ms), task).await {
                Ok(Ok(response)) => response,
                Ok(Err(join_err)) => return Err(AppError::Internal(join_err.to_string())),
                Err(_) => return Err(AppError::Timeout),
            }
        }
        None => state.engine.assess(&context),
    };

    tracing::info!(
        deployment_id = %response.canary_policy.deployment_id,
        risk_score = response.risk_assessment.risk_score,
        risk_level = %response.risk_assessment.risk_level,
        stages = response.canary_policy.stages.len(),
        "assessment complete"
    );

    Ok(Json(response))
}
