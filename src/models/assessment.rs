//! Risk assessment types

use serde::{Deserialize, Serialize};

use super::canary::CanaryPolicy;

/// Risk band derived from the 0-100 risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Known risk factor families; mirrors the risk-tag vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Caching,
    DatabaseSchema,
    ApiContract,
    Traffic,
    Permissions,
    Encryption,
    LoadBalancing,
    Storage,
}

impl RiskFactor {
    /// All factor families, in feature-layout order
    pub const ALL: [RiskFactor; 8] = [
        RiskFactor::Caching,
        RiskFactor::DatabaseSchema,
        RiskFactor::ApiContract,
        RiskFactor::Traffic,
        RiskFactor::Permissions,
        RiskFactor::Encryption,
        RiskFactor::LoadBalancing,
        RiskFactor::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::Caching => "caching",
            RiskFactor::DatabaseSchema => "database_schema",
            RiskFactor::ApiContract => "api_contract",
            RiskFactor::Traffic => "traffic",
            RiskFactor::Permissions => "permissions",
            RiskFactor::Encryption => "encryption",
            RiskFactor::LoadBalancing => "load_balancing",
            RiskFactor::Storage => "storage",
        }
    }

    /// Map a declared risk tag to a factor family; unknown tags map to None
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == tag)
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the ensemble predictor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Combined risk score, 0-100
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// How much to trust the score, 0-100
    pub confidence_percent: f64,
    pub identified_factors: Vec<RiskFactor>,
    pub predicted_error_rate_increase_percent: f64,
    pub predicted_p95_latency_increase_percent: f64,
    /// Component scores, both on the 0-100 scale
    pub heuristic_score: f64,
    pub ml_score: f64,
}

/// Full assessment response: risk plus the derived rollout policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessResponse {
    pub risk_assessment: RiskAssessment,
    pub canary_policy: CanaryPolicy,
}
