//! Risk Pattern Table
//!
//! Static rule table for the heuristic scorer: one entry per risk factor
//! family with a compiled keyword matcher and its numeric contributions.
//! Built once at process start; never recompiled per request.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::RiskFactor;

/// Score contribution per pattern match
pub const PATTERN_WEIGHT: f64 = 15.0;

/// One compiled risk rule
pub struct RiskPattern {
    pub factor: RiskFactor,
    /// Case-insensitive alternation over the family's keywords
    pub matcher: Regex,
    /// Additive predicted p95 latency increase per match, percent
    pub latency_increase_percent: f64,
    /// Additive predicted error-rate increase per match, percent
    pub error_rate_increase_percent: f64,
    /// Score contribution per match
    pub weight: f64,
}

impl RiskPattern {
    /// Number of distinct keywords present in the description.
    /// Repeating a keyword does not count twice.
    pub fn match_count(&self, description: &str) -> usize {
        let mut seen = HashSet::new();
        for m in self.matcher.find_iter(description) {
            seen.insert(m.as_str().to_ascii_lowercase());
        }
        seen.len()
    }
}

/// The static rule table, one entry per risk factor family
pub static RISK_PATTERNS: Lazy<Vec<RiskPattern>> = Lazy::new(|| {
    vec![
        pattern(RiskFactor::Caching, &["cache", "ttl", "redis", "memcached"], 5.0, 0.0),
        pattern(RiskFactor::DatabaseSchema, &["schema", "migration", "database", "sql"], 15.0, 2.0),
        pattern(RiskFactor::ApiContract, &["api", "contract", "endpoint", "request", "response"], 8.0, 1.5),
        pattern(RiskFactor::Traffic, &["load", "traffic", "rampup", "connection"], 20.0, 0.0),
        pattern(RiskFactor::Permissions, &["permission", "auth", "iam", "acl"], 2.0, 1.0),
        pattern(RiskFactor::Encryption, &["encrypt", "tls", "ssl", "certificate"], 10.0, 0.5),
        pattern(RiskFactor::LoadBalancing, &["balancer", "routing", "ingress", "proxy"], 12.0, 1.0),
        pattern(RiskFactor::Storage, &["storage", "disk", "volume", "bucket"], 8.0, 1.0),
    ]
});

fn pattern(
    factor: RiskFactor,
    keywords: &[&str],
    latency_increase_percent: f64,
    error_rate_increase_percent: f64,
) -> RiskPattern {
    let matcher = Regex::new(&format!("(?i){}", keywords.join("|")))
        .expect("static rule pattern must compile");
    RiskPattern {
        factor,
        matcher,
        latency_increase_percent,
        error_rate_increase_percent,
        weight: PATTERN_WEIGHT,
    }
}

/// Look up the rule for a factor family. Every family has exactly one rule.
pub fn pattern_for(factor: RiskFactor) -> &'static RiskPattern {
    RISK_PATTERNS
        .iter()
        .find(|p| p.factor == factor)
        .expect("every risk factor has a rule")
}
