//! Crop Advisor - service object owning every loaded model
//!
//! Runs the request pipeline: validate → encode → scale → predict → rank.
//! All artifacts are loaded once by `CropAdvisor::load` and are read-only
//! afterwards, so one advisor can be shared across threads behind an `Arc`.
//!
//! Artifact policy:
//! - Crop model and scaler are required; any problem is fatal
//! - Fertilizer and yield models are optional; absent files are logged and
//!   the corresponding operation reports `ModelUnavailable`, but a file that
//!   is present and invalid is still fatal

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::encoding::{
    encode_crop_request, encode_fertilizer_request, encode_yield_request, CategoryTable,
    EncodingTables, KeyCase, CROP_FEATURES, FERTILIZER_FEATURES, YIELD_FEATURES,
};
use crate::error::RecommendError;
use crate::fertilizer::{catalog, rules, FertilizerProfile};
use crate::model::{
    argmax, Classifier, ModelArtifact, RandomForestClassifier, RandomForestRegressor, Regressor,
    CROP_MODEL_FILE, CROP_SCALER_FILE, FERTILIZER_MODEL_FILE, YIELD_MODEL_FILE, YIELD_SCALER_FILE,
};
use crate::ranking::{top_k, RankedLabel, TOP_K};
use crate::request::{CropRequest, FertilizerRequest, YieldRequest};
use crate::utils::scaling::FittedScaler;
use crate::validation::validate_inputs;

pub const YIELD_UNIT: &str = "quintals/hectare";

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRecommendation {
    /// `None` when the predicted code has no entry in the crop table
    pub recommended_crop: Option<String>,
    pub top_3: Vec<RankedLabel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Model,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerAdvice {
    pub fertilizer: String,
    pub source: AdviceSource,
    /// Matched rule id (rule-based advice only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Catalog profile, if the fertilizer has one
    pub details: Option<&'static FertilizerProfile>,
}

impl FertilizerAdvice {
    fn from_rule(matched: rules::RuleMatch) -> Self {
        Self {
            fertilizer: matched.fertilizer.to_string(),
            source: AdviceSource::Rules,
            rule: Some(matched.rule),
            reason: Some(matched.reason),
            details: catalog::lookup(matched.fertilizer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldPrediction {
    pub crop: String,
    /// Rounded to 2 decimals
    pub predicted_yield: f64,
    pub unit: &'static str,
}

/// What is loaded, for health reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub crop_classes: usize,
    pub fertilizer_model: bool,
    pub fertilizer_classes: usize,
    pub yield_model: bool,
}

// ============================================================================
// Optional models
// ============================================================================

/// Fertilizer classifier with the label tables it was trained with
pub struct FertilizerModel {
    classifier: Box<dyn Classifier>,
    soil: CategoryTable,
    crop: CategoryTable,
    fertilizer: CategoryTable,
}

impl FertilizerModel {
    pub fn from_artifact(artifact: ModelArtifact<RandomForestClassifier>) -> Result<Self> {
        let soil = label_table("soil type", artifact.encoder("soil")?)?;
        let crop = label_table("crop", artifact.encoder("crop")?)?;
        let fertilizer = label_table("fertilizer", artifact.encoder("fertilizer")?)?;

        if let Some(code) = artifact.model.classes.iter().find(|&&c| fertilizer.label(c).is_none()) {
            anyhow::bail!(
                "fertilizer class {} has no label ({} labels in encoder)",
                code,
                fertilizer.len()
            );
        }

        Ok(Self { classifier: Box::new(artifact.model), soil, crop, fertilizer })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let artifact = ModelArtifact::<RandomForestClassifier>::load(path, &FERTILIZER_FEATURES)?;
        Self::from_artifact(artifact)
            .with_context(|| format!("Invalid fertilizer label encoders: {:?}", path))
    }

    fn predict(&self, req: &FertilizerRequest) -> Result<String, RecommendError> {
        let features = encode_fertilizer_request(&self.soil, &self.crop, req)?;
        let code = self.classifier.predict(features.as_slice());
        Ok(self
            .fertilizer
            .label(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string()))
    }
}

/// Label-encoder table; labels must already be in sorted, unique order
fn label_table(field: &'static str, labels: &[String]) -> Result<CategoryTable> {
    if labels.windows(2).any(|w| w[0] >= w[1]) {
        anyhow::bail!("label encoder for {} is not sorted and unique", field);
    }
    Ok(CategoryTable::from_labels(field, KeyCase::Exact, labels))
}

pub struct YieldModel {
    regressor: Box<dyn Regressor>,
    scaler: FittedScaler,
}

impl YieldModel {
    pub fn new(regressor: RandomForestRegressor, scaler: FittedScaler) -> Result<Self> {
        scaler.ensure_columns(&YIELD_FEATURES)?;
        Ok(Self { regressor: Box::new(regressor), scaler })
    }

    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self> {
        let artifact = ModelArtifact::<RandomForestRegressor>::load(model_path, &YIELD_FEATURES)?;
        let scaler = FittedScaler::load(scaler_path)?;
        Self::new(artifact.model, scaler)
            .with_context(|| format!("Yield scaler does not match model: {:?}", scaler_path))
    }
}

// ============================================================================
// Advisor
// ============================================================================

pub struct CropAdvisor {
    tables: EncodingTables,
    crop_model: Box<dyn Classifier>,
    crop_scaler: FittedScaler,
    fertilizer_model: Option<FertilizerModel>,
    yield_model: Option<YieldModel>,
}

impl CropAdvisor {
    /// Build from a crop classifier and the scaler it was trained behind
    pub fn new(crop_model: Box<dyn Classifier>, crop_scaler: FittedScaler) -> Result<Self> {
        let tables = EncodingTables::new();

        if crop_model.n_features() != CROP_FEATURES.len() {
            anyhow::bail!(
                "crop model expects {} features, encoder produces {}",
                crop_model.n_features(),
                CROP_FEATURES.len()
            );
        }
        crop_scaler.ensure_columns(&CROP_FEATURES)?;

        if let Some(code) = crop_model.classes().iter().find(|&&c| tables.crop.label(c).is_none()) {
            anyhow::bail!("crop model predicts unknown crop code {}", code);
        }

        Ok(Self {
            tables,
            crop_model,
            crop_scaler,
            fertilizer_model: None,
            yield_model: None,
        })
    }

    pub fn with_fertilizer_model(mut self, model: FertilizerModel) -> Self {
        self.fertilizer_model = Some(model);
        self
    }

    pub fn with_yield_model(mut self, model: YieldModel) -> Self {
        self.yield_model = Some(model);
        self
    }

    /// Load every artifact from `artifact_dir`
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        tracing::info!("Loading model artifacts from {:?}", artifact_dir);

        let crop_path = artifact_dir.join(CROP_MODEL_FILE);
        let crop = ModelArtifact::<RandomForestClassifier>::load(&crop_path, &CROP_FEATURES)?;
        let crop_scaler = FittedScaler::load(&artifact_dir.join(CROP_SCALER_FILE))?;
        tracing::info!(
            "Loaded crop model ({} trees, {} classes)",
            crop.model.trees.len(),
            crop.model.classes.len()
        );

        let mut advisor = Self::new(Box::new(crop.model), crop_scaler)
            .with_context(|| format!("Crop artifacts in {:?} are inconsistent", artifact_dir))?;

        let fertilizer_path = artifact_dir.join(FERTILIZER_MODEL_FILE);
        if fertilizer_path.exists() {
            let model = FertilizerModel::load(&fertilizer_path)?;
            tracing::info!("Loaded fertilizer model ({} fertilizers)", model.fertilizer.len());
            advisor = advisor.with_fertilizer_model(model);
        } else {
            tracing::warn!(
                "No fertilizer model at {:?}; fertilizer advice will use rules only",
                fertilizer_path
            );
        }

        let yield_path = artifact_dir.join(YIELD_MODEL_FILE);
        let yield_scaler_path = artifact_dir.join(YIELD_SCALER_FILE);
        match (yield_path.exists(), yield_scaler_path.exists()) {
            (true, true) => {
                advisor = advisor.with_yield_model(YieldModel::load(&yield_path, &yield_scaler_path)?);
                tracing::info!("Loaded yield model");
            }
            (false, false) => {
                tracing::warn!("No yield model in {:?}; yield prediction disabled", artifact_dir);
            }
            (true, false) => anyhow::bail!("Yield model present but scaler missing: {:?}", yield_scaler_path),
            (false, true) => anyhow::bail!("Yield scaler present but model missing: {:?}", yield_path),
        }

        Ok(advisor)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            crop_classes: self.crop_model.classes().len(),
            fertilizer_model: self.fertilizer_model.is_some(),
            fertilizer_classes: self.fertilizer_model.as_ref().map_or(0, |m| m.fertilizer.len()),
            yield_model: self.yield_model.is_some(),
        }
    }

    /// Recommend a crop with the top-3 alternatives
    pub fn recommend_crop(&self, req: &CropRequest) -> Result<CropRecommendation, RecommendError> {
        validate_inputs(&req.conditions, &req.prev_crop, &req.prev_duration)?;

        let raw = encode_crop_request(&self.tables, req)?;
        let scaled = self.crop_scaler.transform(&raw);
        tracing::debug!("Crop features raw={:?} scaled={:?}", raw.as_slice(), scaled.as_slice());

        let proba = self.crop_model.predict_proba(scaled.as_slice());
        let recommended_crop = self
            .crop_model
            .classes()
            .get(argmax(&proba))
            .and_then(|&code| self.tables.crop.label(code))
            .map(str::to_string);
        let top_3 = top_k(&proba, self.crop_model.classes(), &self.tables.crop, TOP_K);

        tracing::debug!("Recommended crop: {:?}", recommended_crop);
        Ok(CropRecommendation { recommended_crop, top_3 })
    }

    /// Model-based advice when the fertilizer model knows the soil and crop,
    /// otherwise the ordered rules
    pub fn recommend_fertilizer(&self, req: &FertilizerRequest) -> FertilizerAdvice {
        let Some(model) = &self.fertilizer_model else {
            return self.recommend_fertilizer_by_rules(req);
        };

        match model.predict(req) {
            Ok(fertilizer) => {
                tracing::debug!("Fertilizer model predicted {}", fertilizer);
                let details = catalog::lookup(&fertilizer);
                FertilizerAdvice {
                    fertilizer,
                    source: AdviceSource::Model,
                    rule: None,
                    reason: None,
                    details,
                }
            }
            Err(e) => {
                tracing::debug!("Fertilizer model cannot encode request ({}); using rules", e);
                self.recommend_fertilizer_by_rules(req)
            }
        }
    }

    pub fn recommend_fertilizer_by_rules(&self, req: &FertilizerRequest) -> FertilizerAdvice {
        let matched = rules::evaluate(req);
        tracing::debug!("Fertilizer rule '{}' matched", matched.rule);
        FertilizerAdvice::from_rule(matched)
    }

    /// Predicted yield in quintals per hectare
    pub fn predict_yield(&self, req: &YieldRequest) -> Result<YieldPrediction, RecommendError> {
        let model = self
            .yield_model
            .as_ref()
            .ok_or(RecommendError::ModelUnavailable("yield"))?;

        validate_inputs(&req.conditions, &req.prev_crop, &req.prev_duration)?;

        let raw = encode_yield_request(&self.tables, req)?;
        let scaled = model.scaler.transform(&raw);
        let value = model.regressor.predict(scaled.as_slice());
        tracing::debug!("Yield prediction for {}: {}", req.crop, value);

        Ok(YieldPrediction {
            crop: req.crop.clone(),
            predicted_yield: round2(value),
            unit: YIELD_UNIT,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
