//! Canary rollout policy types

use serde::{Deserialize, Serialize};

/// One segment of a staged rollout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanaryStage {
    pub index: usize,
    pub name: String,
    pub traffic_percent: f64,
    pub duration_seconds: u64,
}

/// Staged rollout plan with quantitative guardrails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanaryPolicy {
    pub deployment_id: String,
    pub risk_score: f64,
    pub confidence_percent: f64,

    /// Ordered stages; traffic strictly increases and ends at 100
    pub stages: Vec<CanaryStage>,

    /// Error-rate guardrail in percent; breach authorizes rollback
    pub error_rate_threshold_percent: f64,
    /// Latency guardrail in milliseconds
    pub latency_threshold_ms: f64,

    /// Whether a guardrail breach authorizes automatic rollback
    pub rollback_on_violation: bool,
}
