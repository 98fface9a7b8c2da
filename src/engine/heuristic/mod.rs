//! Heuristic Scorer
//!
//! Deterministic rule-based risk scoring from change descriptors.
//! - `patterns`: the static rule table (compiled once at process start)
//! - `scorer`: the scoring logic

pub mod patterns;
pub mod scorer;

pub use patterns::{RiskPattern, RISK_PATTERNS};
pub use scorer::{score, HeuristicAssessment};
