//! Configuration module

use std::env;

/// Default outcome store location
pub const DEFAULT_DB_PATH: &str = "deployment_history.db";

/// Default interval between automatic weight tuning passes
pub const DEFAULT_TUNING_INTERVAL_SEC: u64 = 300;

/// Soft cap on persisted outcome rows; overflow is evicted oldest-first
pub const DEFAULT_RETENTION_CAP: i64 = 1_000_000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Outcome store file path (SQLite)
    pub history_db_path: String,

    /// Server port
    pub port: u16,

    /// Run the background weight tuning scheduler
    pub enable_tuning: bool,

    /// Seconds between tuning passes
    pub tuning_interval_sec: u64,

    /// Initial ensemble weight for the heuristic scorer
    pub heuristic_weight_init: f64,

    /// Initial ensemble weight for the ML scorer
    pub ml_weight_init: f64,

    /// Optional API key required on mutating endpoints
    pub api_auth_key: Option<String>,

    /// Maximum persisted outcome rows before oldest-first eviction
    pub retention_cap: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            history_db_path: env::var("HISTORY_DB_PATH")
                .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            enable_tuning: env::var("ENABLE_TUNING")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true),

            tuning_interval_sec: env::var("TUNING_INTERVAL_SEC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TUNING_INTERVAL_SEC),

            heuristic_weight_init: env::var("HEURISTIC_WEIGHT_INIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.6),

            ml_weight_init: env::var("ML_WEIGHT_INIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.4),

            api_auth_key: env::var("API_AUTH_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            retention_cap: env::var("OUTCOME_RETENTION_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETENTION_CAP),
        }
    }
}
