//! Online ML Scorer
//!
//! A small linear model with logistic squashing over the normalized feature
//! vector. Works with no training data on cold start and supports bounded
//! incremental updates from recorded outcomes.
//!
//! The 0-1 model output is rescaled to the 0-100 risk scale exactly once,
//! in `score`; everything downstream works in 0-100 space.

use serde::{Deserialize, Serialize};

use crate::engine::features::{FeatureVector, FEATURE_COUNT};
use crate::engine::round2;

pub const DEFAULT_LEARNING_RATE: f64 = 0.05;
pub const DEFAULT_L2_PENALTY: f64 = 1e-3;

/// Maximum outcomes consumed by a single update pass
pub const MAX_UPDATE_BATCH: usize = 200;

/// Model parameters. Immutable in use: the engine publishes updates by
/// swapping the whole record, never by mutating fields in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MlParams {
    pub weights: [f64; FEATURE_COUNT],
    pub bias: f64,
}

impl MlParams {
    /// Hand-tuned cold-start parameters.
    ///
    /// The strongly negative bias keeps an empty, healthy context at a
    /// near-zero score; risk-tag indicators dominate so tagged contexts land
    /// near the heuristic on the reference inputs exercised in tests.
    pub fn cold_start() -> Self {
        Self {
            weights: [
                2.0, // num_changes
                2.0, // total_lines_changed
                1.5, // current_error_rate
                1.0, // current_p95_latency
                0.5, // current_qps
                9.0, // tag_caching
                9.5, // tag_database_schema
                8.0, // tag_api_contract
                8.5, // tag_traffic
                7.5, // tag_permissions
                7.5, // tag_encryption
                8.0, // tag_load_balancing
                8.0, // tag_storage
                3.0, // dependency_count
                3.0, // has_db_schema
                2.5, // has_api_contract
                3.3, // has_caching
            ],
            bias: -12.0,
        }
    }
}

impl Default for MlParams {
    fn default() -> Self {
        Self::cold_start()
    }
}

/// Learning hyperparameters for the update pass
#[derive(Debug, Clone, Copy)]
pub struct UpdateConfig {
    pub learning_rate: f64,
    pub l2_penalty: f64,
    pub max_batch: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            l2_penalty: DEFAULT_L2_PENALTY,
            max_batch: MAX_UPDATE_BATCH,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn raw_activation(params: &MlParams, features: &FeatureVector) -> f64 {
    let dot: f64 = params
        .weights
        .iter()
        .zip(features.values.iter())
        .map(|(w, x)| w * x)
        .sum();
    params.bias + dot
}

/// Score a feature vector on the 0-100 risk scale.
/// Exact for a given parameter vector and input.
pub fn score(params: &MlParams, features: &FeatureVector) -> f64 {
    round2(sigmoid(raw_activation(params, features)) * 100.0)
}

/// One stochastic-gradient pass over a batch of (features, actual risk proxy)
/// pairs, minimizing squared error of the 0-1 model output against the proxy.
/// Returns the updated parameter record; the input is untouched.
pub fn sgd_pass(params: &MlParams, batch: &[(FeatureVector, f64)], config: UpdateConfig) -> MlParams {
    let mut updated = *params;

    for (features, target) in batch.iter().take(config.max_batch) {
        let prediction = sigmoid(raw_activation(&updated, features));
        let error = prediction - target;
        // d(err^2)/dz through the logistic
        let gradient = 2.0 * error * prediction * (1.0 - prediction);

        for (weight, value) in updated.weights.iter_mut().zip(features.values.iter()) {
            *weight -= config.learning_rate * (gradient * value + config.l2_penalty * *weight);
        }
        updated.bias -= config.learning_rate * gradient;
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::features::extract;
    use crate::engine::heuristic;
    use crate::models::{ChangeDescriptor, DeploymentContext};

    fn caching_context() -> DeploymentContext {
        DeploymentContext {
            changes: vec![ChangeDescriptor {
                file_path: "src/cache/manager.rs".to_string(),
                change_type: "modify".to_string(),
                lines_changed: 45,
                risk_tags: vec!["caching".to_string()],
                description: "Optimize cache TTL".to_string(),
            }],
            current_error_rate_percent: 0.05,
            current_p95_latency_ms: 180.0,
            rollback_capability: true,
            ..DeploymentContext::minimal("ml-caching")
        }
    }

    fn heavy_context() -> DeploymentContext {
        let change = ChangeDescriptor {
            file_path: "migrations/v9.sql".to_string(),
            change_type: "add".to_string(),
            lines_changed: 300,
            risk_tags: vec!["database_schema".to_string()],
            description: "Apply schema migration and update api contract".to_string(),
        };
        DeploymentContext {
            changes: vec![change; 10],
            ..DeploymentContext::minimal("ml-heavy")
        }
    }

    #[test]
    fn test_cold_start_empty_context_scores_zero() {
        let params = MlParams::cold_start();
        let fv = extract(&DeploymentContext::minimal("empty"));
        assert_eq!(score(&params, &fv), 0.0);
    }

    #[test]
    fn test_cold_start_tracks_heuristic_on_reference_inputs() {
        let params = MlParams::cold_start();
        for ctx in [
            DeploymentContext::minimal("empty"),
            caching_context(),
            heavy_context(),
        ] {
            let heuristic = heuristic::score(&ctx).score;
            let ml = score(&params, &extract(&ctx));
            assert!(
                (heuristic - ml).abs() <= 15.0,
                "cold-start divergence: heuristic={heuristic} ml={ml}"
            );
        }
    }

    #[test]
    fn test_score_is_exact_for_fixed_params() {
        let params = MlParams::cold_start();
        let fv = extract(&caching_context());
        assert_eq!(score(&params, &fv), score(&params, &fv));
    }

    #[test]
    fn test_sgd_moves_score_toward_high_target() {
        let params = MlParams::cold_start();
        let fv = extract(&caching_context());
        let before = score(&params, &fv);

        let batch = vec![(fv, 1.0); 10];
        let updated = sgd_pass(&params, &batch, UpdateConfig::default());
        let after = score(&updated, &fv);

        assert!(after > before, "expected {after} > {before}");
    }

    #[test]
    fn test_sgd_moves_score_toward_low_target() {
        let params = MlParams::cold_start();
        let fv = extract(&caching_context());
        let before = score(&params, &fv);

        let batch = vec![(fv, 0.0); 10];
        let updated = sgd_pass(&params, &batch, UpdateConfig::default());
        let after = score(&updated, &fv);

        assert!(after < before, "expected {after} < {before}");
    }

    #[test]
    fn test_sgd_batch_is_bounded() {
        let params = MlParams::cold_start();
        let fv = extract(&caching_context());
        let config = UpdateConfig {
            max_batch: 3,
            ..UpdateConfig::default()
        };

        let capped = sgd_pass(&params, &vec![(fv, 1.0); 500], config);
        let exact = sgd_pass(&params, &vec![(fv, 1.0); 3], config);
        assert_eq!(capped.bias, exact.bias);
        assert_eq!(capped.weights, exact.weights);
    }

    #[test]
    fn test_original_params_untouched_by_update() {
        let params = MlParams::cold_start();
        let fv = extract(&caching_context());
        let _ = sgd_pass(&params, &[(fv, 1.0)], UpdateConfig::default());
        assert_eq!(params.bias, MlParams::cold_start().bias);
    }
}
