//! Request-level errors
//!
//! Everything a caller can get wrong about a single request. These are
//! deterministic input errors: they are reported once, at the request
//! boundary, as a single human-readable message. Artifact-loading failures
//! are not represented here; they surface as `anyhow::Error` from
//! `CropAdvisor::load` and stop the process before it serves traffic.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// Numeric field outside its inclusive range
    #[error("{field} should be in the range {min} to {max}.")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// Categorical value missing from its lookup table
    #[error("Invalid input for {field}: '{value}' is not a recognised value.")]
    UnknownCategory {
        field: &'static str,
        value: String,
    },

    /// Inputs are individually valid but contradict each other
    #[error("{0}")]
    DomainRule(String),

    #[error("Missing required field '{0}'.")]
    MissingField(&'static str),

    /// Optional model was not present in the artifact directory at start-up
    #[error("The {0} model is not loaded on this server.")]
    ModelUnavailable(&'static str),
}

impl RecommendError {
    /// True for errors caused by the request itself (as opposed to server setup)
    pub fn is_input_error(&self) -> bool {
        !matches!(self, RecommendError::ModelUnavailable(_))
    }
}
