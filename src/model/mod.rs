//! Trained predictors
//!
//! Inference traits, the random-forest implementation behind them, the JSON
//! artifact envelope they are persisted in, and the offline fitting code.

pub mod artifacts;
pub mod forest;
pub mod training;

pub use artifacts::{
    ArtifactModel, ModelArtifact, CROP_MODEL_FILE, CROP_SCALER_FILE, FERTILIZER_MODEL_FILE,
    FORMAT_VERSION, YIELD_MODEL_FILE, YIELD_SCALER_FILE,
};
pub use forest::{DecisionTree, RandomForestClassifier, RandomForestRegressor, TreeNode};
pub use training::{ForestParams, MaxFeatures};

/// A fitted classifier over integer class codes
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Class codes in the order `predict_proba` reports them
    fn classes(&self) -> &[i64];

    /// Probability per class, aligned with `classes()`
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    /// Most probable class; the earliest class wins a tie. -1 when the
    /// model has no classes.
    fn predict(&self, features: &[f64]) -> i64 {
        let proba = self.predict_proba(features);
        self.classes().get(argmax(&proba)).copied().unwrap_or(-1)
    }
}

/// Index of the largest probability; the earliest index wins a tie
pub fn argmax(proba: &[f64]) -> usize {
    let mut best = 0;
    for (idx, p) in proba.iter().enumerate().skip(1) {
        if *p > proba[best] {
            best = idx;
        }
    }
    best
}

/// A fitted regressor
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> f64;
}
