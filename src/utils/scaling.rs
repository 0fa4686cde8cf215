//! Feature Scaling
//!
//! Applies the per-column transform fitted during training. The fitted
//! parameters are persisted next to the model and loaded once at start-up.
//!
//! Values outside the fitted range are passed through unclipped: a min-max
//! scaled value may land outside [0, 1].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::encoding::FeatureVector;

/// Fitted transform parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleTransform {
    /// `(x - min) / (max - min)`
    MinMax { min: Vec<f64>, max: Vec<f64> },
    /// `(x - mean) / std`
    Standard { mean: Vec<f64>, std: Vec<f64> },
}

/// A fitted scaler together with the columns it was fitted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub feature_names: Vec<String>,
    #[serde(flatten)]
    pub transform: ScaleTransform,
}

impl FittedScaler {
    /// Load scaler parameters from JSON and check they are well-formed
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scaler file: {:?}", path))?;

        let scaler: FittedScaler = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scaler JSON: {:?}", path))?;

        scaler.check_shape()?;
        Ok(scaler)
    }

    /// Fit min-max parameters column-wise over `rows`
    pub fn fit_min_max(feature_names: &[&str], rows: &[Vec<f64>]) -> Result<Self> {
        let n = feature_names.len();
        if rows.is_empty() {
            anyhow::bail!("Cannot fit scaler on an empty dataset");
        }

        let mut min = vec![f64::INFINITY; n];
        let mut max = vec![f64::NEG_INFINITY; n];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n {
                anyhow::bail!("Row {} has {} values, expected {}", row_idx, row.len(), n);
            }
            for (i, &value) in row.iter().enumerate() {
                min[i] = min[i].min(value);
                max[i] = max[i].max(value);
            }
        }

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            transform: ScaleTransform::MinMax { min, max },
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize scaler")?;
        fs::write(path, json).with_context(|| format!("Failed to write scaler file: {:?}", path))
    }

    /// Scale every row of a training matrix
    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| self.transform(&FeatureVector::new(row.clone())).into_inner())
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Fail unless the scaler was fitted on exactly `expected`, in order
    pub fn ensure_columns(&self, expected: &[&str]) -> Result<()> {
        if self.feature_names.iter().map(String::as_str).ne(expected.iter().copied()) {
            anyhow::bail!(
                "Scaler columns {:?} do not match expected columns {:?}",
                self.feature_names,
                expected
            );
        }
        Ok(())
    }

    fn check_shape(&self) -> Result<()> {
        let n = self.n_features();
        let (a, b) = match &self.transform {
            ScaleTransform::MinMax { min, max } => (min.len(), max.len()),
            ScaleTransform::Standard { mean, std } => (mean.len(), std.len()),
        };
        if a != n || b != n {
            anyhow::bail!(
                "Scaler has {} feature names but parameter lengths {} and {}",
                n, a, b
            );
        }
        Ok(())
    }

    /// Scale a vector (same order, same length)
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let raw = features.as_slice();
        let scaled = match &self.transform {
            ScaleTransform::MinMax { min, max } => raw
                .iter()
                .zip(min.iter().zip(max.iter()))
                .map(|(&x, (&lo, &hi))| (x - lo) / nonzero(hi - lo))
                .collect(),
            ScaleTransform::Standard { mean, std } => raw
                .iter()
                .zip(mean.iter().zip(std.iter()))
                .map(|(&x, (&mu, &sigma))| (x - mu) / nonzero(sigma))
                .collect(),
        };
        FeatureVector::new(scaled)
    }
}

/// Constant columns divide by 1
#[inline]
fn nonzero(divisor: f64) -> f64 {
    if divisor == 0.0 { 1.0 } else { divisor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn min_max(min: Vec<f64>, max: Vec<f64>) -> FittedScaler {
        FittedScaler {
            feature_names: (0..min.len()).map(|i| format!("f{}", i)).collect(),
            transform: ScaleTransform::MinMax { min, max },
        }
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = min_max(vec![0.0, 10.0], vec![100.0, 20.0]);
        let out = scaler.transform(&FeatureVector::new(vec![50.0, 12.5]));
        assert_relative_eq!(out.as_slice()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(out.as_slice()[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_values_outside_fitted_range_are_not_clipped() {
        let scaler = min_max(vec![0.0], vec![100.0]);
        let out = scaler.transform(&FeatureVector::new(vec![150.0]));
        assert_relative_eq!(out.as_slice()[0], 1.5, epsilon = 1e-12);
        let out = scaler.transform(&FeatureVector::new(vec![-20.0]));
        assert_relative_eq!(out.as_slice()[0], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_divides_by_one() {
        let scaler = min_max(vec![3.0], vec![3.0]);
        let out = scaler.transform(&FeatureVector::new(vec![5.0]));
        assert_relative_eq!(out.as_slice()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standard_transform() {
        let scaler = FittedScaler {
            feature_names: vec!["a".into()],
            transform: ScaleTransform::Standard { mean: vec![10.0], std: vec![2.0] },
        };
        let out = scaler.transform(&FeatureVector::new(vec![13.0]));
        assert_relative_eq!(out.as_slice()[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_json_format_and_shape_check() {
        let json = r#"{"feature_names": ["a", "b"], "kind": "min_max", "min": [0, 1], "max": [1]}"#;
        let scaler: FittedScaler = serde_json::from_str(json).unwrap();
        assert!(scaler.check_shape().is_err());
    }

    #[test]
    fn test_fit_min_max_and_column_check() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 2.0], vec![2.0, 9.0]];
        let scaler = FittedScaler::fit_min_max(&["x", "y"], &rows).unwrap();
        assert_eq!(
            scaler.transform,
            ScaleTransform::MinMax { min: vec![1.0, 2.0], max: vec![3.0, 9.0] }
        );
        assert!(scaler.ensure_columns(&["x", "y"]).is_ok());
        assert!(scaler.ensure_columns(&["y", "x"]).is_err());
        assert!(scaler.ensure_columns(&["x"]).is_err());
    }
}
