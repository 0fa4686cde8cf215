//! Model Artifacts
//!
//! Every trained model is written as one JSON document: a small envelope
//! recording the format version, the feature columns the model was fitted on
//! and any label encoders, wrapping the serialized forest itself.
//!
//! Loading is strict. A column list that differs from what the encoder
//! produces, or a forest whose shape disagrees with its envelope, is a
//! start-up error.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

pub const CROP_MODEL_FILE: &str = "crop_model.json";
pub const CROP_SCALER_FILE: &str = "crop_scaler.json";
pub const FERTILIZER_MODEL_FILE: &str = "fertilizer_model.json";
pub const YIELD_MODEL_FILE: &str = "yield_model.json";
pub const YIELD_SCALER_FILE: &str = "yield_scaler.json";

/// Structural checks a model runs on itself after deserialization
pub trait ArtifactModel {
    fn validate(&self, n_features: usize) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact<M> {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Label-encoder classes per categorical column, in fitted (sorted) order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub label_encoders: BTreeMap<String, Vec<String>>,
    pub model: M,
}

impl<M> ModelArtifact<M>
where
    M: ArtifactModel + Serialize + DeserializeOwned,
{
    pub fn new(feature_names: &[&str], model: M) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            label_encoders: BTreeMap::new(),
            model,
        }
    }

    pub fn with_encoder(mut self, column: &str, classes: Vec<String>) -> Self {
        self.label_encoders.insert(column.to_string(), classes);
        self
    }

    /// Read an artifact and check it against the expected column order
    pub fn load(path: &Path, expected_features: &[&str]) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {:?}", path))?;

        let artifact: ModelArtifact<M> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse model artifact JSON: {:?}", path))?;

        artifact
            .check(expected_features)
            .with_context(|| format!("Invalid model artifact: {:?}", path))?;

        Ok(artifact)
    }

    fn check(&self, expected_features: &[&str]) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            anyhow::bail!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            );
        }
        if self.feature_names.iter().map(String::as_str).ne(expected_features.iter().copied()) {
            anyhow::bail!(
                "feature columns {:?} do not match expected columns {:?}",
                self.feature_names, expected_features
            );
        }
        self.model.validate(self.feature_names.len())
    }

    /// Label-encoder classes for a column the artifact must carry
    pub fn encoder(&self, column: &str) -> Result<&[String]> {
        self.label_encoders
            .get(column)
            .map(Vec::as_slice)
            .with_context(|| format!("artifact has no label encoder for '{}'", column))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize model artifact")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write model artifact: {:?}", path))?;
        Ok(())
    }
}
