//! Risk & Policy Engine
//!
//! Assessment pipeline:
//! - `features`  -> normalized, versioned feature vector
//! - `heuristic` -> rule-based score + risk factors          (deterministic)
//! - `ml`        -> linear+sigmoid score                     (online-updated)
//! - `ensemble`  -> weighted combination + confidence
//! - `canary`    -> staged rollout policy with guardrails
//!
//! Learning loop:
//! - `recorder`  -> re-score at outcome time, persist
//! - `tuner`     -> grid-search weights + one SGD pass
//! - `scheduler` -> periodic tuning worker
//!
//! All shared mutable state (ensemble weights, ML parameters, calibration)
//! lives on the `Engine` value and is published by whole-record swaps, so a
//! prediction always sees one consistent snapshot.

pub mod canary;
pub mod ensemble;
pub mod features;
pub mod heuristic;
pub mod ml;
pub mod recorder;
pub mod scheduler;
pub mod tuner;


use parking_lot::RwLock;
use sqlx::SqlitePool;

use crate::models::{AssessResponse, DeploymentContext, DeploymentOutcome, RiskAssessment, RiskLevel};

pub use ensemble::EnsembleWeights;
pub use ml::MlParams;
pub use recorder::RecordError;
pub use tuner::{TuneError, TuneResult};

/// The engine context value. Process-global by construction (one per
/// process, shared behind an `Arc`), but always reached by reference;
/// there is no ambient singleton.
pub struct Engine {
    pool: SqlitePool,
    weights: RwLock<EnsembleWeights>,
    ml_params: RwLock<MlParams>,
    /// Cached historical calibration; refreshed on record and tune so the
    /// request path never touches the store
    calibration: RwLock<f64>,
    update_config: ml::UpdateConfig,
    retention_cap: i64,
    tune_lock: tokio::sync::Mutex<()>,
}

impl Engine {
    pub fn new(pool: SqlitePool, weights: EnsembleWeights, retention_cap: i64) -> Self {
        Self {
            pool,
            weights: RwLock::new(weights),
            ml_params: RwLock::new(MlParams::cold_start()),
            calibration: RwLock::new(ensemble::COLD_CALIBRATION),
            update_config: ml::UpdateConfig::default(),
            retention_cap,
            tune_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.pool.is_closed()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn weights(&self) -> EnsembleWeights {
        *self.weights.read()
    }

    pub(crate) fn set_weights(&self, weights: EnsembleWeights) {
        *self.weights.write() = weights;
    }

    pub fn ml_params(&self) -> MlParams {
        *self.ml_params.read()
    }

    pub(crate) fn set_ml_params(&self, params: MlParams) {
        *self.ml_params.write() = params;
    }

    pub fn calibration(&self) -> f64 {
        *self.calibration.read()
    }

    pub(crate) fn update_config(&self) -> ml::UpdateConfig {
        self.update_config
    }

    pub(crate) fn retention_cap(&self) -> i64 {
        self.retention_cap
    }

    pub(crate) fn tune_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.tune_lock
    }

    /// Run both scorers and combine them into a risk assessment.
    ///
    /// CPU-only and free of side effects. Weights, ML parameters, and
    /// calibration are snapshotted once at entry, so the components of a
    /// single prediction are always mutually consistent.
    pub fn predict(&self, context: &DeploymentContext) -> RiskAssessment {
        let weights = self.weights();
        let params = self.ml_params();
        let calibration = self.calibration();

        let heuristic = heuristic::score(context);
        let feature_vector = features::extract(context);
        let ml_score = ml::score(&params, &feature_vector);

        let final_score = weights.combine(heuristic.score, ml_score);
        let agreement = ensemble::agreement(heuristic.score, ml_score);
        let confidence = ensemble::confidence(agreement, heuristic.confidence, calibration);

        RiskAssessment {
            risk_score: final_score,
            risk_level: RiskLevel::from_score(final_score),
            confidence_percent: confidence,
            identified_factors: heuristic.identified_factors,
            predicted_error_rate_increase_percent: heuristic.predicted_error_rate_increase_percent,
            predicted_p95_latency_increase_percent: heuristic
                .predicted_p95_latency_increase_percent,
            heuristic_score: heuristic.score,
            ml_score,
        }
    }

    /// Full assessment: risk plus the derived canary policy.
    /// Idempotent and pure relative to the current weights snapshot.
    pub fn assess(&self, context: &DeploymentContext) -> AssessResponse {
        let risk_assessment = self.predict(context);
        let canary_policy = canary::generate_policy(context, &risk_assessment);
        AssessResponse {
            risk_assessment,
            canary_policy,
        }
    }

    /// Record a deployment outcome; see `recorder`
    pub async fn record(
        &self,
        context: &DeploymentContext,
        actual_error_rate_percent: f64,
        actual_latency_change_percent: f64,
        rollback_triggered: bool,
    ) -> Result<DeploymentOutcome, RecordError> {
        recorder::record(
            self,
            context,
            actual_error_rate_percent,
            actual_latency_change_percent,
            rollback_triggered,
        )
        .await
    }

    /// Run one weight tuning pass; see `tuner`
    pub async fn tune(&self) -> Result<TuneResult, TuneError> {
        tuner::run(self).await
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<DeploymentOutcome>, sqlx::Error> {
        DeploymentOutcome::recent(&self.pool, limit).await
    }

    pub async fn outcome_count(&self) -> Result<i64, sqlx::Error> {
        DeploymentOutcome::count(&self.pool).await
    }

    /// Recompute the cached calibration from the most recent outcomes
    pub async fn refresh_calibration(&self) -> Result<f64, sqlx::Error> {
        let recent = DeploymentOutcome::recent(&self.pool, ensemble::CALIBRATION_WINDOW).await?;
        let value = ensemble::calibration_from_outcomes(&recent);
        *self.calibration.write() = value;
        Ok(value)
    }
}

/// Round to two decimals; applied where scores cross a module boundary
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
