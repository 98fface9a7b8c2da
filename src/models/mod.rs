//! Data models

pub mod deployment;
pub mod assessment;
pub mod canary;
pub mod outcome;

pub use deployment::*;
pub use assessment::*;
pub use canary::*;
pub use outcome::*;
