//! Typed request inputs
//!
//! These are the fully-populated inputs the pipelines consume. The HTTP layer
//! parses loosely-typed bodies (every field optional) and converts them here,
//! turning absent fields into `RecommendError::MissingField`.

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;

/// Soil nutrient and weather measurements shared by the crop and yield paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteConditions {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl SiteConditions {
    /// Value of a numeric field by its wire name
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "N" => Some(self.nitrogen),
            "P" => Some(self.phosphorus),
            "K" => Some(self.potassium),
            "temperature" => Some(self.temperature),
            "humidity" => Some(self.humidity),
            "ph" => Some(self.ph),
            "rainfall" => Some(self.rainfall),
            _ => None,
        }
    }
}

/// Input to the crop recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    #[serde(flatten)]
    pub conditions: SiteConditions,
    pub soil: String,
    pub prev_crop: String,
    pub prev_duration: String,
    pub rec_duration: String,
    pub season: String,
}

/// Input to the yield predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRequest {
    #[serde(flatten)]
    pub conditions: SiteConditions,
    pub soil: String,
    pub season: String,
    pub prev_crop: String,
    pub prev_duration: String,
    /// Crop whose yield is being predicted
    pub crop: String,
}

/// Input to both fertilizer recommenders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerRequest {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub soil_type: String,
    pub crop_type: String,
}

/// Unwrap an optional field or report it as missing
pub fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecommendError> {
    value.ok_or(RecommendError::MissingField(field))
}

/// Unwrap an optional text field, treating blank strings as missing
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, RecommendError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(RecommendError::MissingField(field)),
    }
}
