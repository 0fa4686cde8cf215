//! Crop Advisor
//!
//! Crop, fertilizer and yield recommendations from soil and weather
//! measurements.
//!
//! Request pipeline:
//! - `validation`: static range table and the short-term crop rule
//! - `encoding`: categorical lookup tables and fixed-order feature vectors
//! - `utils::scaling`: fitted min-max / standard transform
//! - `model`: random-forest inference, artifacts and offline fitting
//! - `ranking`: top-3 alternatives
//!
//! `recommender::CropAdvisor` owns the loaded artifacts and runs the
//! pipeline; `api_server` (feature `api`) exposes it over HTTP.

pub mod companions;
pub mod config;
pub mod data;
pub mod encoding;
pub mod error;
pub mod fertilizer;
pub mod model;
pub mod ranking;
pub mod recommender;
pub mod request;
pub mod utils;
pub mod validation;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::RecommendError;
pub use recommender::{
    AdviceSource, CropAdvisor, CropRecommendation, FertilizerAdvice, ModelSummary,
    YieldPrediction,
};
pub use request::{CropRequest, FertilizerRequest, SiteConditions, YieldRequest};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
