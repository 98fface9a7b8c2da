//! Versioned feature vector + extraction

use serde::{Deserialize, Serialize};

use crate::engine::heuristic::patterns;
use crate::models::{DeploymentContext, RiskFactor};

use super::layout::{
    layout_hash, DEPENDENCY_CAP, ERROR_RATE_CAP, FEATURE_COUNT, FEATURE_VERSION, LATENCY_CAP,
    LINES_CHANGED_CAP, NUM_CHANGES_CAP, QPS_CAP,
};

/// Feature vector tagged with the layout it was extracted under.
/// Persisted alongside outcomes so the learner can replay exact inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Whether this vector was extracted under the current layout
    pub fn is_compatible(&self) -> bool {
        self.version == FEATURE_VERSION && self.layout_hash == layout_hash()
    }
}

/// Extract the normalized feature vector from a deployment context.
/// All values land in [0, 1]; ordering follows `FEATURE_LAYOUT`.
pub fn extract(context: &DeploymentContext) -> FeatureVector {
    let mut values = [0.0f64; FEATURE_COUNT];

    values[0] = norm(context.changes.len() as f64, NUM_CHANGES_CAP);
    values[1] = norm(context.total_lines_changed() as f64, LINES_CHANGED_CAP);
    values[2] = norm(context.current_error_rate_percent, ERROR_RATE_CAP);
    values[3] = norm(context.current_p95_latency_ms, LATENCY_CAP);
    values[4] = norm(context.current_qps, QPS_CAP);

    for (offset, factor) in RiskFactor::ALL.iter().enumerate() {
        values[5 + offset] = indicator(has_tag(context, *factor));
    }

    values[13] = norm(context.distinct_dependency_count() as f64, DEPENDENCY_CAP);

    values[14] = indicator(description_mentions(context, RiskFactor::DatabaseSchema));
    values[15] = indicator(description_mentions(context, RiskFactor::ApiContract));
    values[16] = indicator(description_mentions(context, RiskFactor::Caching));

    FeatureVector {
        version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        values,
    }
}

fn norm(value: f64, cap: f64) -> f64 {
    (value / cap).clamp(0.0, 1.0)
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn has_tag(context: &DeploymentContext, factor: RiskFactor) -> bool {
    context.changes.iter().any(|change| {
        change
            .risk_tags
            .iter()
            .any(|tag| RiskFactor::from_tag(tag) == Some(factor))
    })
}

fn description_mentions(context: &DeploymentContext, factor: RiskFactor) -> bool {
    let pattern = patterns::pattern_for(factor);
    context
        .changes
        .iter()
        .any(|change| pattern.matcher.is_match(&change.description))
}
