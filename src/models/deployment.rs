//! Deployment context model - the immutable per-request input

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Accepted values for `ChangeDescriptor::change_type`
pub const CHANGE_TYPES: &[&str] = &["add", "modify", "delete"];

/// One code change inside a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    #[serde(default)]
    pub file_path: String,

    /// One of `add`, `modify`, `delete`
    #[serde(default = "default_change_type")]
    pub change_type: String,

    #[serde(default)]
    pub lines_changed: u32,

    /// Declared risk tags; unknown tags are tolerated and ignored
    #[serde(default)]
    pub risk_tags: Vec<String>,

    #[serde(default)]
    pub description: String,
}

fn default_change_type() -> String {
    "modify".to_string()
}

/// Full context of a deployment assessment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub deployment_id: String,

    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub changes: Vec<ChangeDescriptor>,

    // Service health baseline
    #[serde(default)]
    pub current_error_rate_percent: f64,
    #[serde(default)]
    pub current_p95_latency_ms: f64,

    // SLO targets
    #[serde(default = "default_target_error_rate")]
    pub target_error_rate_percent: f64,
    #[serde(default = "default_target_latency")]
    pub target_p95_latency_ms: f64,

    // Traffic info
    #[serde(default)]
    pub current_qps: f64,

    #[serde(default)]
    pub rollback_capability: bool,

    /// Declared downstream services
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_target_error_rate() -> f64 {
    0.1
}

fn default_target_latency() -> f64 {
    500.0
}

impl DeploymentContext {
    /// Minimal context for outcome recording when the caller supplies only an id
    pub fn minimal(deployment_id: &str) -> Self {
        Self {
            deployment_id: deployment_id.to_string(),
            service_name: "unknown".to_string(),
            environment: "unknown".to_string(),
            version: "unknown".to_string(),
            changes: Vec::new(),
            current_error_rate_percent: 0.0,
            current_p95_latency_ms: 0.0,
            target_error_rate_percent: default_target_error_rate(),
            target_p95_latency_ms: default_target_latency(),
            current_qps: 0.0,
            rollback_capability: false,
            dependencies: Vec::new(),
        }
    }

    pub fn total_lines_changed(&self) -> u64 {
        self.changes.iter().map(|c| c.lines_changed as u64).sum()
    }

    pub fn distinct_dependency_count(&self) -> usize {
        self.dependencies
            .iter()
            .map(|d| d.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Check numeric ranges and enum values; unknown risk tags pass through
    pub fn validate(&self) -> Result<(), String> {
        if self.deployment_id.trim().is_empty() {
            return Err("deployment_id must not be empty".to_string());
        }

        check_range(
            "current_error_rate_percent",
            self.current_error_rate_percent,
            0.0,
            100.0,
        )?;
        check_non_negative("current_p95_latency_ms", self.current_p95_latency_ms)?;
        check_non_negative("target_error_rate_percent", self.target_error_rate_percent)?;
        check_non_negative("target_p95_latency_ms", self.target_p95_latency_ms)?;
        check_non_negative("current_qps", self.current_qps)?;

        for change in &self.changes {
            if !CHANGE_TYPES.contains(&change.change_type.as_str()) {
                return Err(format!(
                    "unknown change_type '{}' (expected one of: {})",
                    change.change_type,
                    CHANGE_TYPES.join(", ")
                ));
            }
        }

        Ok(())
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a finite value >= 0", field));
    }
    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{} must be a finite value in [{}, {}]", field, min, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_context() -> DeploymentContext {
        DeploymentContext {
            deployment_id: "deploy-1".to_string(),
            service_name: "user-service".to_string(),
            environment: "production".to_string(),
            version: "v1.0.0".to_string(),
            changes: vec![ChangeDescriptor {
                file_path: "src/cache.rs".to_string(),
                change_type: "modify".to_string(),
                lines_changed: 12,
                risk_tags: vec!["caching".to_string()],
                description: "Tune cache TTL".to_string(),
            }],
            current_error_rate_percent: 0.1,
            current_p95_latency_ms: 200.0,
            target_error_rate_percent: 0.1,
            target_p95_latency_ms: 500.0,
            current_qps: 1000.0,
            rollback_capability: true,
            dependencies: vec!["payments".to_string()],
        }
    }

    #[test]
    fn test_valid_context_passes() {
        assert!(valid_context().validate().is_ok());
    }

    #[test]
    fn test_negative_error_rate_rejected() {
        let mut ctx = valid_context();
        ctx.current_error_rate_percent = -1.0;
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let mut ctx = valid_context();
        ctx.current_qps = f64::NAN;
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_unknown_change_type_rejected() {
        let mut ctx = valid_context();
        ctx.changes[0].change_type = "rename".to_string();
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_unknown_risk_tags_tolerated() {
        let mut ctx = valid_context();
        ctx.changes[0].risk_tags.push("experimental".to_string());
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_distinct_dependencies_deduplicated() {
        let mut ctx = valid_context();
        ctx.dependencies = vec![
            "payments".to_string(),
            "payments".to_string(),
            "ledger".to_string(),
        ];
        assert_eq!(ctx.distinct_dependency_count(), 2);
    }

    #[test]
    fn test_minimal_context_is_valid() {
        let ctx = DeploymentContext::minimal("d-42");
        assert!(ctx.validate().is_ok());
        assert_eq!(ctx.service_name, "unknown");
        assert!(ctx.changes.is_empty());
    }
}
