//! Deployment outcome model - persisted learning records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::deployment::DeploymentContext;

/// Weighting of observed signals in the actual risk proxy
const PROXY_ROLLBACK_WEIGHT: f64 = 0.5;
const PROXY_ERROR_WEIGHT: f64 = 0.3;
const PROXY_LATENCY_WEIGHT: f64 = 0.2;
const PROXY_LATENCY_SCALE: f64 = 50.0;

/// One recorded deployment outcome. Rows are append-only; the scores are the
/// ensemble values captured at recording time so each row stays reproducible
/// under later weight changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeploymentOutcome {
    #[serde(default)]
    pub id: i64,
    pub deployment_id: String,
    pub heuristic_score: f64,
    pub ml_score: f64,
    pub final_score: f64,
    pub actual_error_rate_percent: f64,
    pub actual_latency_change_percent: f64,
    pub rollback_triggered: bool,
    pub timestamp: DateTime<Utc>,

    /// Feature vector snapshot as JSON; engine-private, not part of the wire format
    #[serde(skip_serializing, default)]
    pub features: Option<String>,
}

/// Values for a new outcome row
#[derive(Debug, Clone)]
pub struct NewOutcome {
    pub deployment_id: String,
    pub heuristic_score: f64,
    pub ml_score: f64,
    pub final_score: f64,
    pub actual_error_rate_percent: f64,
    pub actual_latency_change_percent: f64,
    pub rollback_triggered: bool,
    pub timestamp: DateTime<Utc>,
    pub features: Option<String>,
}

impl DeploymentOutcome {
    /// Atomic, durable insert
    pub async fn insert(pool: &SqlitePool, new: NewOutcome) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, DeploymentOutcome>(
            r#"
            INSERT INTO outcomes (
                deployment_id, heuristic_score, ml_score, final_score,
                actual_error_rate_percent, actual_latency_change_percent,
                rollback_triggered, timestamp, features
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.deployment_id)
        .bind(new.heuristic_score)
        .bind(new.ml_score)
        .bind(new.final_score)
        .bind(new.actual_error_rate_percent)
        .bind(new.actual_latency_change_percent)
        .bind(new.rollback_triggered)
        .bind(new.timestamp)
        .bind(&new.features)
        .fetch_one(pool)
        .await
    }

    /// Up to `limit` most recent rows, newest first (insertion order)
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DeploymentOutcome>(
            "SELECT * FROM outcomes ORDER BY id DESC LIMIT ?",
        )
        .bind(limit.max(0))
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM outcomes")
            .fetch_one(pool)
            .await
    }

    /// Delete rows older than the newest `cap`, oldest first
    pub async fn evict_over_cap(pool: &SqlitePool, cap: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM outcomes WHERE id NOT IN (SELECT id FROM outcomes ORDER BY id DESC LIMIT ?)",
        )
        .bind(cap.max(0))
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Actual risk proxy in [0, 1]: the deterministic learning target derived
    /// from what was observed after the deployment ran.
    pub fn risk_proxy(&self) -> f64 {
        let rollback = if self.rollback_triggered { 1.0 } else { 0.0 };
        (PROXY_ROLLBACK_WEIGHT * rollback
            + PROXY_ERROR_WEIGHT * self.actual_error_rate_percent
            + PROXY_LATENCY_WEIGHT * (self.actual_latency_change_percent / PROXY_LATENCY_SCALE))
            .clamp(0.0, 1.0)
    }
}

/// Record-outcome request. A context is optional: callers that only observed
/// the deployment can report by id and a minimal context is synthesized.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordOutcomeRequest {
    pub deployment_id: String,
    #[serde(default)]
    pub context: Option<DeploymentContext>,
    pub actual_error_rate_percent: f64,
    pub actual_latency_change_percent: f64,
    #[serde(default)]
    pub rollback_triggered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcomeResponse {
    pub status: &'static str,
    pub deployment_id: String,
    pub final_score: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub total: usize,
    pub outcomes: Vec<DeploymentOutcome>,
}
