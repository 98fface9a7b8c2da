//! Weight Tuner
//!
//! Grid-searches the ensemble weight pair against recent outcomes, smooths
//! toward the winner, and runs one SGD pass over the ML scorer using the
//! feature vectors persisted with those outcomes. At most one tune runs at
//! a time; readers of the weights are only blocked for a record swap.

use crate::engine::features::FeatureVector;
use crate::engine::{ensemble::EnsembleWeights, ml, Engine};
use crate::models::DeploymentOutcome;

/// Most recent outcomes consumed per tuning pass
pub const TUNE_SAMPLE_LIMIT: i64 = 100;

/// Below this many outcomes the weights are left unchanged
pub const MIN_TUNE_SAMPLES: usize = 5;

/// Candidate heuristic weights: 0.0, 0.1, ... 1.0
const GRID_STEPS: u32 = 10;

/// Share of the grid-search winner in the smoothed result
const SMOOTHING: f64 = 0.7;

#[derive(Debug)]
pub enum TuneError {
    /// Another tune is already in flight
    Busy,
    Storage(sqlx::Error),
}

impl std::fmt::Display for TuneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuneError::Busy => write!(f, "tune already in flight"),
            TuneError::Storage(err) => write!(f, "outcome store error: {}", err),
        }
    }
}

impl std::error::Error for TuneError {}

#[derive(Debug, Clone, Copy)]
pub struct TuneResult {
    pub heuristic_weight: f64,
    pub ml_weight: f64,
    pub samples_used: usize,
}

pub(crate) async fn run(engine: &Engine) -> Result<TuneResult, TuneError> {
    let _guard = engine.tune_lock().try_lock().map_err(|_| TuneError::Busy)?;

    let outcomes = DeploymentOutcome::recent(engine.pool(), TUNE_SAMPLE_LIMIT)
        .await
        .map_err(TuneError::Storage)?;

    let current = engine.weights();
    if outcomes.len() < MIN_TUNE_SAMPLES {
        tracing::debug!(
            samples = outcomes.len(),
            "not enough outcomes to tune; weights unchanged"
        );
        return Ok(TuneResult {
            heuristic_weight: current.heuristic,
            ml_weight: current.ml,
            samples_used: outcomes.len(),
        });
    }

    let chosen = grid_search(&outcomes, current.heuristic);
    let smoothed = SMOOTHING * chosen + (1.0 - SMOOTHING) * current.heuristic;
    let weights = EnsembleWeights::normalized(smoothed, 1.0 - smoothed);

    // Single SGD pass over the same sample window, replaying the persisted
    // feature vectors. Rows recorded under an older layout are skipped.
    let config = engine.update_config();
    let batch: Vec<(FeatureVector, f64)> = outcomes
        .iter()
        .filter_map(|outcome| {
            let raw = outcome.features.as_deref()?;
            let features: FeatureVector = serde_json::from_str(raw).ok()?;
            features.is_compatible().then_some((features, outcome.risk_proxy()))
        })
        .take(config.max_batch)
        .collect();

    if !batch.is_empty() {
        let updated = ml::sgd_pass(&engine.ml_params(), &batch, config);
        engine.set_ml_params(updated);
    }

    engine.set_weights(weights);

    if let Err(e) = engine.refresh_calibration().await {
        tracing::warn!("calibration refresh failed after tune: {}", e);
    }

    Ok(TuneResult {
        heuristic_weight: weights.heuristic,
        ml_weight: weights.ml,
        samples_used: outcomes.len(),
    })
}

/// Evaluate every candidate pair against the proxy targets; lowest MSE wins,
/// ties prefer the candidate closest to the current heuristic weight.
fn grid_search(outcomes: &[DeploymentOutcome], current_heuristic: f64) -> f64 {
    let targets: Vec<f64> = outcomes.iter().map(|o| o.risk_proxy() * 100.0).collect();

    let mut best_weight = current_heuristic;
    let mut best_mse = f64::INFINITY;

    for step in 0..=GRID_STEPS {
        let heuristic_weight = step as f64 / GRID_STEPS as f64;
        let ml_weight = 1.0 - heuristic_weight;

        let mse = outcomes
            .iter()
            .zip(&targets)
            .map(|(o, target)| {
                let predicted = heuristic_weight * o.heuristic_score + ml_weight * o.ml_score;
                (predicted - target).powi(2)
            })
            .sum::<f64>()
            / outcomes.len() as f64;

        let tied = (mse - best_mse).abs() <= 1e-9;
        let closer =
            (heuristic_weight - current_heuristic).abs() < (best_weight - current_heuristic).abs();
        if mse < best_mse - 1e-9 || (tied && closer) {
            best_mse = mse;
            best_weight = heuristic_weight;
        }
    }

    best_weight
}
