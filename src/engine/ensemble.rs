//! Ensemble Predictor
//!
//! Weighted combination of the heuristic and ML scores plus the confidence
//! blend: predictor agreement, heuristic pattern coverage, and historical
//! calibration against recorded outcomes.

use serde::{Deserialize, Serialize};

use crate::engine::round2;
use crate::models::DeploymentOutcome;

/// Confidence blend factors
const AGREEMENT_WEIGHT: f64 = 0.6;
const HEURISTIC_CONFIDENCE_WEIGHT: f64 = 0.2;
const CALIBRATION_WEIGHT: f64 = 0.2;

/// Outcomes considered when deriving historical calibration
pub const CALIBRATION_WINDOW: i64 = 20;

/// Minimum outcomes before calibration leaves its neutral cold-start value
pub const MIN_CALIBRATION_SAMPLES: usize = 5;

/// Neutral calibration used until enough outcomes accumulate
pub const COLD_CALIBRATION: f64 = 50.0;

/// The two ensemble coefficients. Always sums to 1; published as a whole
/// record so readers never observe a partial update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub heuristic: f64,
    pub ml: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            heuristic: 0.6,
            ml: 0.4,
        }
    }
}

impl EnsembleWeights {
    /// Build from operator-supplied initial values. Falls back to the
    /// defaults when either value is out of range or the pair does not sum
    /// to 1.
    pub fn from_init(heuristic: f64, ml: f64) -> Self {
        let in_range = heuristic.is_finite()
            && ml.is_finite()
            && (0.0..=1.0).contains(&heuristic)
            && (0.0..=1.0).contains(&ml)
            && (heuristic + ml - 1.0).abs() <= 1e-9;
        if in_range {
            Self { heuristic, ml }
        } else {
            tracing::warn!(
                heuristic,
                ml,
                "initial ensemble weights invalid; using defaults"
            );
            Self::default()
        }
    }

    /// Renormalize an arbitrary non-negative pair to sum 1
    pub fn normalized(heuristic: f64, ml: f64) -> Self {
        let sum = heuristic + ml;
        if !sum.is_finite() || sum <= f64::EPSILON {
            return Self::default();
        }
        Self {
            heuristic: heuristic / sum,
            ml: ml / sum,
        }
    }

    /// Combine the two component scores (both 0-100)
    pub fn combine(&self, heuristic_score: f64, ml_score: f64) -> f64 {
        round2(self.heuristic * heuristic_score + self.ml * ml_score)
    }
}

/// Predictor agreement on the 0-100 scale: 100 when both scores coincide
pub fn agreement(heuristic_score: f64, ml_score: f64) -> f64 {
    100.0 - (heuristic_score - ml_score).abs().min(100.0)
}

/// Blend agreement, heuristic pattern coverage, and historical calibration
/// into the final confidence percentage.
pub fn confidence(agreement: f64, heuristic_confidence: f64, calibration: f64) -> f64 {
    round2(
        (AGREEMENT_WEIGHT * agreement
            + HEURISTIC_CONFIDENCE_WEIGHT * heuristic_confidence
            + CALIBRATION_WEIGHT * calibration)
            .clamp(0.0, 100.0),
    )
}

/// Historical calibration from recent outcomes: mean absolute error of the
/// recorded final score against the actual risk proxy, inverted onto 0-100.
/// Below the sample floor the neutral cold-start value applies.
pub fn calibration_from_outcomes(outcomes: &[DeploymentOutcome]) -> f64 {
    if outcomes.len() < MIN_CALIBRATION_SAMPLES {
        return COLD_CALIBRATION;
    }

    let mean_abs_error = outcomes
        .iter()
        .map(|o| (o.final_score - o.risk_proxy() * 100.0).abs())
        .sum::<f64>()
        / outcomes.len() as f64;

    100.0 - mean_abs_error.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn outcome(final_score: f64, proxy_error: f64) -> DeploymentOutcome {
        // proxy = 0.3 * actual_error_rate_percent when no rollback/latency
        DeploymentOutcome {
            id: 0,
            deployment_id: "cal".to_string(),
            heuristic_score: final_score,
            ml_score: final_score,
            final_score,
            actual_error_rate_percent: proxy_error,
            actual_latency_change_percent: 0.0,
            rollback_triggered: false,
            timestamp: Utc::now(),
            features: None,
        }
    }

    #[test]
    fn test_default_weights() {
        let w = EnsembleWeights::default();
        assert_eq!(w.heuristic, 0.6);
        assert_eq!(w.ml, 0.4);
    }

    #[test]
    fn test_from_init_rejects_bad_sums() {
        let w = EnsembleWeights::from_init(0.7, 0.7);
        assert_eq!(w.heuristic, 0.6);

        let w = EnsembleWeights::from_init(0.25, 0.75);
        assert_eq!(w.heuristic, 0.25);
        assert_eq!(w.ml, 0.75);
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let w = EnsembleWeights::normalized(0.3, 0.9);
        assert!((w.heuristic + w.ml - 1.0).abs() <= 1e-9);
        assert!((w.heuristic - 0.25).abs() <= 1e-9);
    }

    #[test]
    fn test_combine_is_convex() {
        let w = EnsembleWeights::default();
        let combined = w.combine(40.0, 80.0);
        assert!(combined >= 40.0 && combined <= 80.0);
        assert_eq!(combined, 56.0);
    }

    #[test]
    fn test_agreement_bounds() {
        assert_eq!(agreement(50.0, 50.0), 100.0);
        assert_eq!(agreement(0.0, 100.0), 0.0);
        assert_eq!(agreement(30.0, 70.0), 60.0);
    }

    #[test]
    fn test_cold_start_confidence_formula() {
        // 0 outcomes: calibration stays at its neutral value
        let cal = calibration_from_outcomes(&[]);
        assert_eq!(cal, COLD_CALIBRATION);
        assert_eq!(confidence(100.0, 50.0, cal), 80.0);
    }

    #[test]
    fn test_calibration_needs_sample_floor() {
        let few: Vec<_> = (0..4).map(|_| outcome(50.0, 0.0)).collect();
        assert_eq!(calibration_from_outcomes(&few), COLD_CALIBRATION);
    }

    #[test]
    fn test_perfect_predictions_yield_full_calibration() {
        // final 30 vs proxy 0.3 (*100) -> zero error
        let rows: Vec<_> = (0..6).map(|_| outcome(30.0, 1.0)).collect();
        assert_eq!(calibration_from_outcomes(&rows), 100.0);
    }

    #[test]
    fn test_bad_predictions_floor_at_zero() {
        let rows: Vec<_> = (0..6).map(|_| outcome(100.0, 0.0)).collect();
        assert_eq!(calibration_from_outcomes(&rows), 0.0);
    }

    #[test]
    fn test_confidence_clamped() {
        assert!(confidence(100.0, 95.0, 100.0) <= 100.0);
        assert!(confidence(0.0, 0.0, 0.0) >= 0.0);
    }
}
