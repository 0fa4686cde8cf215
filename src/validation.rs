//! Input Validation
//!
//! Range checks against a fixed per-field table plus the short-term crop
//! duration rule. First failure wins; errors are never accumulated.

use crate::error::RecommendError;
use crate::request::SiteConditions;

/// Inclusive bounds for one numeric field
#[derive(Debug, Clone, Copy)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Checked in this order
pub static INPUT_RANGES: &[FieldRange] = &[
    FieldRange { field: "N", min: 0.0, max: 100.0 },
    FieldRange { field: "P", min: 0.0, max: 100.0 },
    FieldRange { field: "K", min: 0.0, max: 100.0 },
    FieldRange { field: "temperature", min: 0.0, max: 60.0 },
    FieldRange { field: "humidity", min: 0.0, max: 100.0 },
    FieldRange { field: "ph", min: 0.0, max: 14.0 },
    FieldRange { field: "rainfall", min: 0.0, max: 300.0 },
];

/// Crops whose cycle is too short for a "long" previous-season duration
pub static SHORT_TERM_CROPS: &[&str] = &[
    "rice", "maize", "lentil", "mungbean", "blackgram", "jute", "onion", "cotton",
];

/// Validate the numeric fields, then the previous-crop duration rule
pub fn validate_inputs(
    conditions: &SiteConditions,
    prev_crop: &str,
    prev_duration: &str,
) -> Result<(), RecommendError> {
    check_ranges(conditions)?;
    check_prev_duration(prev_crop, prev_duration)
}

/// First out-of-range field, if any
pub fn check_ranges(conditions: &SiteConditions) -> Result<(), RecommendError> {
    for range in INPUT_RANGES {
        // NaN fails `contains`, as does a field the table names but the struct lacks
        let value = conditions.field(range.field).unwrap_or(f64::NAN);
        if !range.contains(value) {
            return Err(RecommendError::OutOfRange {
                field: range.field,
                min: range.min,
                max: range.max,
            });
        }
    }
    Ok(())
}

/// A short-term previous crop cannot have had a long duration
pub fn check_prev_duration(prev_crop: &str, prev_duration: &str) -> Result<(), RecommendError> {
    let crop = prev_crop.to_lowercase();
    if SHORT_TERM_CROPS.contains(&crop.as_str()) && prev_duration.eq_ignore_ascii_case("long") {
        return Err(RecommendError::DomainRule(format!(
            "{} is a short-term crop, so the previous duration should be 'short'.",
            capitalize(prev_crop)
        )));
    }
    Ok(())
}

/// First character upper-cased, the rest lower-cased
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
