//! Outcome recording and history handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::models::{
    DeploymentContext, HistoryQuery, HistoryResponse, RecordOutcomeRequest, RecordOutcomeResponse,
};
use crate::{AppError, AppResult, AppState};

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Record an observed deployment outcome.
///
/// Runs to durable completion once validation passes, even if the caller
/// disconnects mid-request.
pub async fn record(
    State(state): State<AppState>,
    Json(request): Json<RecordOutcomeRequest>,
) -> AppResult<Json<RecordOutcomeResponse>> {
    if request.deployment_id.trim().is_empty() {
        return Err(AppError::Validation("deployment_id must not be empty".to_string()));
    }
    if !state.engine.is_ready() {
        return Err(AppError::NotReady);
    }

    let context = match request.context {
        Some(context) => context,
        None => {
            tracing::warn!(
                deployment_id = %request.deployment_id,
                "no context supplied; synthesizing empty-changes context"
            );
            DeploymentContext::minimal(&request.deployment_id)
        }
    };

    let engine = state.engine.clone();
    let write = tokio::spawn(async move {
        engine
            .record(
                &context,
                request.actual_error_rate_percent,
                request.actual_latency_change_percent,
                request.rollback_triggered,
            )
            .await
    });

    let outcome = write
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(RecordOutcomeResponse {
        status: "success",
        deployment_id: outcome.deployment_id,
        final_score: outcome.final_score,
        timestamp: outcome.timestamp,
    }))
}

/// List recent outcomes, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(0..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 0 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let outcomes = state.engine.recent(limit).await?;
    Ok(Json(HistoryResponse {
        total: outcomes.len(),
        outcomes,
    }))
}
