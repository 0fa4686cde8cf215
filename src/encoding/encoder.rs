//! Feature Encoding
//!
//! Builds the fixed-order numeric vectors each model was fitted on. Column
//! order is part of the model contract: artifacts record the names they were
//! trained with and loading rejects any mismatch against the lists below.

use crate::encoding::category_table::{CategoryTable, EncodingTables};
use crate::error::RecommendError;
use crate::request::{CropRequest, FertilizerRequest, SiteConditions, YieldRequest};

/// Column order of the crop classifier
pub const CROP_FEATURES: [&str; 12] = [
    "N", "P", "K", "temperature", "humidity", "ph", "rainfall",
    "soil", "prev_crop", "prev_duration", "season", "rec_duration",
];

/// Column order of the yield regressor
pub const YIELD_FEATURES: [&str; 12] = [
    "N", "P", "K", "temperature", "humidity", "ph", "rainfall",
    "soil", "season", "prev_crop", "prev_duration", "crop",
];

/// Column order of the fertilizer classifier (unscaled)
pub const FERTILIZER_FEATURES: [&str; 6] = [
    "N", "P", "K", "soil", "temperature", "crop",
];

/// Ordered model input for one request
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Integer codes resolved for a crop request (kept for logging and tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropCodes {
    pub soil: i64,
    pub prev_crop: i64,
    pub season: i64,
    pub prev_duration: i64,
    pub rec_duration: i64,
}

fn numeric_prefix(c: &SiteConditions) -> Vec<f64> {
    vec![c.nitrogen, c.phosphorus, c.potassium, c.temperature, c.humidity, c.ph, c.rainfall]
}

/// Resolve the categorical fields of a crop request
///
/// Soil, previous crop and season must all be known; durations fall back to
/// "short" for anything other than "long".
pub fn crop_codes(tables: &EncodingTables, req: &CropRequest) -> Result<CropCodes, RecommendError> {
    Ok(CropCodes {
        soil: tables.soil.encode(&req.soil)?,
        prev_crop: tables.crop.encode(&req.prev_crop)?,
        season: tables.season.encode(&req.season)?,
        prev_duration: tables.duration_code(&req.prev_duration),
        rec_duration: tables.duration_code(&req.rec_duration),
    })
}

/// Encode a crop request in `CROP_FEATURES` order
pub fn encode_crop_request(
    tables: &EncodingTables,
    req: &CropRequest,
) -> Result<FeatureVector, RecommendError> {
    let codes = crop_codes(tables, req)?;

    let mut values = numeric_prefix(&req.conditions);
    values.extend([
        codes.soil as f64,
        codes.prev_crop as f64,
        codes.prev_duration as f64,
        codes.season as f64,
        codes.rec_duration as f64,
    ]);
    Ok(FeatureVector::new(values))
}

/// Encode a yield request in `YIELD_FEATURES` order
pub fn encode_yield_request(
    tables: &EncodingTables,
    req: &YieldRequest,
) -> Result<FeatureVector, RecommendError> {
    let soil = tables.soil.encode(&req.soil)?;
    let season = tables.season.encode(&req.season)?;
    let prev_crop = tables.crop.encode(&req.prev_crop)?;
    let prev_duration = tables.duration_code(&req.prev_duration);
    let crop = tables.crop.encode(&req.crop)?;

    let mut values = numeric_prefix(&req.conditions);
    values.extend([
        soil as f64,
        season as f64,
        prev_crop as f64,
        prev_duration as f64,
        crop as f64,
    ]);
    Ok(FeatureVector::new(values))
}

/// Encode a fertilizer request in `FERTILIZER_FEATURES` order
///
/// Soil and crop tables come from the fertilizer artifact's label encoders.
pub fn encode_fertilizer_request(
    soil_table: &CategoryTable,
    crop_table: &CategoryTable,
    req: &FertilizerRequest,
) -> Result<FeatureVector, RecommendError> {
    let soil = soil_table.encode(req.soil_type.trim())?;
    let crop = crop_table.encode(req.crop_type.trim())?;

    Ok(FeatureVector::new(vec![
        req.nitrogen,
        req.phosphorus,
        req.potassium,
        soil as f64,
        req.temperature,
        crop as f64,
    ]))
}
