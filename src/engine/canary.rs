//! Canary Policy Generator
//!
//! Pure mapping from (risk band, confidence band) to a staged rollout plan
//! with guardrail thresholds. Risk determines caution, confidence determines
//! speed: confident low-risk deploys ramp fast, uncertain risky ones crawl.

use crate::models::{
    CanaryPolicy, CanaryStage, DeploymentContext, RiskAssessment, RiskFactor, RiskLevel,
};

/// Confidence bands used by the stage matrix
const CONFIDENCE_HIGH: f64 = 80.0;
const CONFIDENCE_MEDIUM: f64 = 60.0;

/// Latency guardrail cap applied whenever a caching factor was identified
const CACHING_LATENCY_CAP_MS: f64 = 200.0;

/// Base stage templates: (name, traffic percent, duration seconds)
const STAGES_3: &[(&str, f64, u64)] = &[
    ("smoke", 10.0, 180),
    ("majority", 50.0, 300),
    ("full", 100.0, 300),
];

const STAGES_4: &[(&str, f64, u64)] = &[
    ("smoke", 5.0, 300),
    ("light", 25.0, 420),
    ("majority", 50.0, 420),
    ("full", 100.0, 300),
];

const STAGES_5: &[(&str, f64, u64)] = &[
    ("smoke", 5.0, 300),
    ("light", 10.0, 420),
    ("half", 25.0, 600),
    ("majority", 50.0, 600),
    ("full", 100.0, 300),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    fn from_percent(confidence: f64) -> Self {
        if confidence >= CONFIDENCE_HIGH {
            ConfidenceBand::High
        } else if confidence >= CONFIDENCE_MEDIUM {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Generate the rollout policy for an assessed deployment
pub fn generate_policy(context: &DeploymentContext, assessment: &RiskAssessment) -> CanaryPolicy {
    let risk_band = assessment.risk_level;
    let confidence_band = ConfidenceBand::from_percent(assessment.confidence_percent);

    let (template, duration_multiplier) = select_template(risk_band, confidence_band);

    let stages = template
        .iter()
        .enumerate()
        .map(|(index, (name, traffic, duration))| CanaryStage {
            index,
            name: name.to_string(),
            traffic_percent: *traffic,
            duration_seconds: (*duration as f64 * duration_multiplier).round() as u64,
        })
        .collect();

    let (error_rate_threshold_percent, mut latency_threshold_ms) = guardrails(risk_band);

    if assessment.identified_factors.contains(&RiskFactor::Caching) {
        latency_threshold_ms = latency_threshold_ms.min(CACHING_LATENCY_CAP_MS);
    }

    CanaryPolicy {
        deployment_id: context.deployment_id.clone(),
        risk_score: assessment.risk_score,
        confidence_percent: assessment.confidence_percent,
        stages,
        error_rate_threshold_percent,
        latency_threshold_ms,
        rollback_on_violation: context.rollback_capability && risk_band.is_high(),
    }
}

/// The stage matrix: risk band picks the row, confidence band the column
fn select_template(
    risk: RiskLevel,
    confidence: ConfidenceBand,
) -> (&'static [(&'static str, f64, u64)], f64) {
    match (risk, confidence) {
        (RiskLevel::Low, ConfidenceBand::High) => (STAGES_3, 0.8),
        (RiskLevel::Low, ConfidenceBand::Medium) => (STAGES_4, 1.0),
        (RiskLevel::Low, ConfidenceBand::Low) => (STAGES_5, 1.2),

        (RiskLevel::Moderate, ConfidenceBand::High) => (STAGES_4, 1.0),
        (RiskLevel::Moderate, ConfidenceBand::Medium) => (STAGES_4, 1.2),
        (RiskLevel::Moderate, ConfidenceBand::Low) => (STAGES_5, 1.5),

        (RiskLevel::High, ConfidenceBand::High) => (STAGES_4, 1.2),
        (RiskLevel::High, ConfidenceBand::Medium) => (STAGES_5, 1.5),
        (RiskLevel::High, ConfidenceBand::Low) => (STAGES_5, 1.8),

        (RiskLevel::Critical, ConfidenceBand::High) => (STAGES_5, 1.5),
        (RiskLevel::Critical, ConfidenceBand::Medium) => (STAGES_5, 1.8),
        (RiskLevel::Critical, ConfidenceBand::Low) => (STAGES_5, 2.0),
    }
}

/// Guardrail thresholds by risk band: (error rate percent, latency ms)
fn guardrails(risk: RiskLevel) -> (f64, f64) {
    match risk {
        RiskLevel::Critical => (0.2, 200.0),
        RiskLevel::High => (0.3, 250.0),
        RiskLevel::Moderate | RiskLevel::Low => (0.5, 500.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(score: f64, confidence: f64, factors: Vec<RiskFactor>) -> RiskAssessment {
        RiskAssessment {
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            confidence_percent: confidence,
            identified_factors: factors,
            predicted_error_rate_increase_percent: 0.0,
            predicted_p95_latency_increase_percent: 0.0,
            heuristic_score: score,
            ml_score: score,
        }
    }

    fn context(rollback: bool) -> DeploymentContext {
        DeploymentContext {
            rollback_capability: rollback,
            ..DeploymentContext::minimal("canary-test")
        }
    }

    fn assert_invariants(policy: &CanaryPolicy) {
        assert!(!policy.stages.is_empty());
        assert_eq!(policy.stages.last().unwrap().traffic_percent, 100.0);
        assert!(policy.stages[0].traffic_percent > 0.0);
        for pair in policy.stages.windows(2) {
            assert!(pair[0].traffic_percent < pair[1].traffic_percent);
        }
        assert!(policy.error_rate_threshold_percent > 0.0);
        assert!(policy.latency_threshold_ms > 0.0);
    }

    #[test]
    fn test_low_risk_high_confidence_is_fast() {
        let policy = generate_policy(&context(true), &assessment(10.0, 90.0, vec![]));
        assert_invariants(&policy);
        assert_eq!(policy.stages.len(), 3);
        assert_eq!(policy.stages[0].traffic_percent, 10.0);
        // 180s base scaled by 0.8
        assert_eq!(policy.stages[0].duration_seconds, 144);
        assert!(!policy.rollback_on_violation);
    }

    #[test]
    fn test_critical_risk_always_five_stages() {
        for confidence in [95.0, 70.0, 30.0] {
            let policy = generate_policy(&context(true), &assessment(85.0, confidence, vec![]));
            assert_invariants(&policy);
            assert_eq!(policy.stages.len(), 5);
            assert_eq!(policy.stages[0].traffic_percent, 5.0);
        }
    }

    #[test]
    fn test_critical_low_confidence_doubles_durations() {
        let policy = generate_policy(&context(true), &assessment(85.0, 30.0, vec![]));
        assert_eq!(policy.stages[0].duration_seconds, 600);
        assert_eq!(policy.stages[2].duration_seconds, 1200);
    }

    #[test]
    fn test_guardrails_tighten_with_risk() {
        let low = generate_policy(&context(false), &assessment(10.0, 90.0, vec![]));
        let high = generate_policy(&context(false), &assessment(60.0, 90.0, vec![]));
        let critical = generate_policy(&context(false), &assessment(85.0, 90.0, vec![]));

        assert_eq!(low.error_rate_threshold_percent, 0.5);
        assert_eq!(low.latency_threshold_ms, 500.0);
        assert_eq!(high.error_rate_threshold_percent, 0.3);
        assert_eq!(high.latency_threshold_ms, 250.0);
        assert_eq!(critical.error_rate_threshold_percent, 0.2);
        assert_eq!(critical.latency_threshold_ms, 200.0);
    }

    #[test]
    fn test_caching_factor_caps_latency_guardrail() {
        // Even a low-risk deploy with a caching factor gets the tight cap
        let policy = generate_policy(
            &context(false),
            &assessment(10.0, 90.0, vec![RiskFactor::Caching]),
        );
        assert_eq!(policy.latency_threshold_ms, 200.0);
    }

    #[test]
    fn test_rollback_flag_requires_capability_and_risk() {
        let no_capability = generate_policy(&context(false), &assessment(60.0, 70.0, vec![]));
        assert!(!no_capability.rollback_on_violation);

        let low_risk = generate_policy(&context(true), &assessment(10.0, 70.0, vec![]));
        assert!(!low_risk.rollback_on_violation);

        let risky = generate_policy(&context(true), &assessment(60.0, 70.0, vec![]));
        assert!(risky.rollback_on_violation);

        let critical = generate_policy(&context(true), &assessment(85.0, 70.0, vec![]));
        assert!(critical.rollback_on_violation);
    }

    #[test]
    fn test_confidence_band_boundaries() {
        // moderate risk: >=80 high band (4 stages x1.0), >=60 medium (4 x1.2)
        let high = generate_policy(&context(false), &assessment(40.0, 80.0, vec![]));
        assert_eq!(high.stages[0].duration_seconds, 300);

        let medium = generate_policy(&context(false), &assessment(40.0, 79.99, vec![]));
        assert_eq!(medium.stages[0].duration_seconds, 360);

        let low = generate_policy(&context(false), &assessment(40.0, 59.99, vec![]));
        assert_eq!(low.stages.len(), 5);
    }

    #[test]
    fn test_all_matrix_cells_satisfy_invariants() {
        for score in [10.0, 40.0, 60.0, 85.0] {
            for confidence in [90.0, 70.0, 40.0] {
                let policy = generate_policy(&context(true), &assessment(score, confidence, vec![]));
                assert_invariants(&policy);
            }
        }
    }
}
