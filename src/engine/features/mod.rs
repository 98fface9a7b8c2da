//! Feature extraction for the ML scorer
//!
//! - `layout`: authoritative feature ordering, version, and layout hash
//! - `vector`: versioned feature vector + extraction from a deployment context

pub mod layout;
pub mod vector;

pub use layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{extract, FeatureVector};
