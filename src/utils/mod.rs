//! Utility modules shared by training and serving
//!
//! - Scaling: fitted min-max / standard feature transforms

pub mod scaling;

// Re-export commonly used types
pub use scaling::{FittedScaler, ScaleTransform};
