//! Feature Layout - Centralized Feature Definition
//!
//! Add, remove, or reorder a feature -> increment FEATURE_VERSION.
//! The layout hash lets the learner reject persisted vectors recorded
//! under an incompatible layout.

use crc32fast::Hasher;

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Feature names in the exact order they appear in the vector.
/// This is the single source of truth for the feature layout.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Change shape (0-1) ===
    "num_changes",          // 0: change count / 50
    "total_lines_changed",  // 1: total lines / 5000

    // === Service health (2-4) ===
    "current_error_rate",   // 2: percent / 10
    "current_p95_latency",  // 3: ms / 2000
    "current_qps",          // 4: qps / 10000

    // === Risk-tag families (5-12), 0/1 indicators ===
    "tag_caching",          // 5
    "tag_database_schema",  // 6
    "tag_api_contract",     // 7
    "tag_traffic",          // 8
    "tag_permissions",      // 9
    "tag_encryption",       // 10
    "tag_load_balancing",   // 11
    "tag_storage",          // 12

    // === Topology (13) ===
    "dependency_count",     // 13: distinct dependencies / 10

    // === Description-derived indicators (14-16) ===
    "has_db_schema",        // 14
    "has_api_contract",     // 15
    "has_caching",          // 16
];

/// Total number of features. Must match FEATURE_LAYOUT.len()
pub const FEATURE_COUNT: usize = 17;

// Normalization caps; inputs are clamped to [0, 1] after division
pub const NUM_CHANGES_CAP: f64 = 50.0;
pub const LINES_CHANGED_CAP: f64 = 5000.0;
pub const ERROR_RATE_CAP: f64 = 10.0;
pub const LATENCY_CAP: f64 = 2000.0;
pub const QPS_CAP: f64 = 10_000.0;
pub const DEPENDENCY_CAP: f64 = 10.0;

/// CRC32 hash over version + feature names, used to detect layout mismatches
/// when replaying persisted vectors.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_count_matches() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_is_stable() {
        assert_eq!(layout_hash(), layout_hash());
    }
}
