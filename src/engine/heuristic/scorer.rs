//! Heuristic scoring logic
//!
//! Pure function of the deployment context: no clock, no randomness, no I/O.
//! Same input always yields an identical result.

use crate::models::{DeploymentContext, RiskFactor};

use super::patterns::RISK_PATTERNS;

/// Points per change descriptor
const CHANGE_COUNT_WEIGHT: f64 = 2.0;

/// Additional score when a change spans multiple downstream services
const MULTI_SERVICE_BONUS: f64 = 10.0;

/// Minimum declared dependencies that count as a multi-service change
const MULTI_SERVICE_MIN_DEPS: usize = 2;

const CONFIDENCE_BASE: f64 = 50.0;
const CONFIDENCE_PER_MATCH: f64 = 10.0;
const CONFIDENCE_MAX: f64 = 95.0;

/// Output of the heuristic scorer
#[derive(Debug, Clone)]
pub struct HeuristicAssessment {
    /// Rule-based risk score, 0-100
    pub score: f64,
    /// Pattern-coverage confidence, 0-95
    pub confidence: f64,
    pub identified_factors: Vec<RiskFactor>,
    pub predicted_error_rate_increase_percent: f64,
    pub predicted_p95_latency_increase_percent: f64,
    pub matched_patterns: usize,
}

/// Score a deployment context against the static rule table.
///
/// Each rule counts one match per distinct keyword found in a change's
/// description, plus one per declared risk tag naming the rule's factor.
/// Unknown risk tags match no rule and are ignored.
pub fn score(context: &DeploymentContext) -> HeuristicAssessment {
    let mut matched_patterns = 0usize;
    let mut identified_factors: Vec<RiskFactor> = Vec::new();
    let mut pattern_score = 0.0f64;
    let mut latency_increase = 0.0f64;
    let mut error_increase = 0.0f64;

    for change in &context.changes {
        for pattern in RISK_PATTERNS.iter() {
            let mut hits = pattern.match_count(&change.description);
            if change
                .risk_tags
                .iter()
                .any(|tag| RiskFactor::from_tag(tag) == Some(pattern.factor))
            {
                hits += 1;
            }
            if hits == 0 {
                continue;
            }

            matched_patterns += hits;
            pattern_score += pattern.weight * hits as f64;
            latency_increase += pattern.latency_increase_percent * hits as f64;
            error_increase += pattern.error_rate_increase_percent * hits as f64;

            if !identified_factors.contains(&pattern.factor) {
                identified_factors.push(pattern.factor);
            }
        }
    }

    let mut score = context.changes.len() as f64 * CHANGE_COUNT_WEIGHT
        + pattern_score
        + size_factor(context.total_lines_changed());
    score = score.clamp(0.0, 100.0);

    if context.distinct_dependency_count() >= MULTI_SERVICE_MIN_DEPS {
        score = (score + MULTI_SERVICE_BONUS).min(100.0);
    }

    let confidence = (CONFIDENCE_BASE + CONFIDENCE_PER_MATCH * matched_patterns as f64)
        .clamp(0.0, CONFIDENCE_MAX);

    HeuristicAssessment {
        score,
        confidence,
        identified_factors,
        predicted_error_rate_increase_percent: error_increase.clamp(0.0, 100.0),
        predicted_p95_latency_increase_percent: latency_increase.clamp(0.0, 100.0),
        matched_patterns,
    }
}

/// Piecewise size contribution from total lines changed
fn size_factor(total_lines: u64) -> f64 {
    if total_lines <= 50 {
        0.0
    } else if total_lines <= 500 {
        10.0
    } else {
        25.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeDescriptor;

    fn change(description: &str, tags: &[&str], lines: u32) -> ChangeDescriptor {
        ChangeDescriptor {
            file_path: "src/lib.rs".to_string(),
            change_type: "modify".to_string(),
            lines_changed: lines,
            risk_tags: tags.iter().map(|t| t.to_string()).collect(),
            description: description.to_string(),
        }
    }

    fn context(changes: Vec<ChangeDescriptor>) -> DeploymentContext {
        DeploymentContext {
            changes,
            ..DeploymentContext::minimal("heur-test")
        }
    }

    #[test]
    fn test_empty_context_scores_zero() {
        let result = score(&context(vec![]));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 50.0);
        assert!(result.identified_factors.is_empty());
    }

    #[test]
    fn test_caching_change_counts_keywords_and_tag() {
        let result = score(&context(vec![change("Optimize cache TTL", &["caching"], 45)]));
        // "cache" + "ttl" + the caching tag
        assert_eq!(result.matched_patterns, 3);
        assert_eq!(result.score, 47.0); // 1*2 + 3*15 + 0
        assert_eq!(result.confidence, 80.0);
        assert_eq!(result.identified_factors, vec![RiskFactor::Caching]);
        assert_eq!(result.predicted_p95_latency_increase_percent, 15.0);
    }

    #[test]
    fn test_determinism() {
        let ctx = context(vec![change("sql migration plus api endpoint", &["database_schema"], 300)]);
        let a = score(&ctx);
        let b = score(&ctx);
        assert_eq!(a.score, b.score);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.matched_patterns, b.matched_patterns);
        assert_eq!(a.identified_factors, b.identified_factors);
    }

    #[test]
    fn test_size_factor_boundaries() {
        assert_eq!(size_factor(0), 0.0);
        assert_eq!(size_factor(50), 0.0);
        assert_eq!(size_factor(51), 10.0);
        assert_eq!(size_factor(500), 10.0);
        assert_eq!(size_factor(501), 25.0);
    }

    #[test]
    fn test_score_clamped_to_100() {
        let changes: Vec<_> = (0..20)
            .map(|_| change("schema migration database sql api endpoint", &["database_schema"], 400))
            .collect();
        let result = score(&context(changes));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.confidence, 95.0);
    }

    #[test]
    fn test_multi_service_bonus() {
        let mut ctx = context(vec![change("tiny tweak", &[], 5)]);
        let base = score(&ctx).score;
        ctx.dependencies = vec!["billing".to_string(), "ledger".to_string()];
        assert_eq!(score(&ctx).score, base + 10.0);
    }

    #[test]
    fn test_unknown_tags_ignored() {
        let with_unknown = score(&context(vec![change("plain refactor", &["experimental"], 10)]));
        let without = score(&context(vec![change("plain refactor", &[], 10)]));
        assert_eq!(with_unknown.score, without.score);
        assert!(with_unknown.identified_factors.is_empty());
    }

    #[test]
    fn test_impact_predictions_non_negative() {
        let result = score(&context(vec![change("load test rampup traffic", &["traffic"], 100)]));
        assert!(result.predicted_error_rate_increase_percent >= 0.0);
        assert!(result.predicted_p95_latency_increase_percent >= 0.0);
    }
}
