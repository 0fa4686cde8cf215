//! Random Forest Inference
//!
//! Flat decision-tree ensembles as produced by the trainer. Each tree is a
//! node array in pre-order: children always sit at higher indices than their
//! parent, which `validate` checks so a walk is guaranteed to terminate.
//!
//! Split convention: `x[feature] <= threshold` goes left.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ArtifactModel, Classifier, Regressor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class distribution (classifier) or a single mean value (regressor)
    Leaf { values: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tolerance on the sum of a leaf class distribution
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// What a leaf must hold
#[derive(Debug, Clone, Copy)]
enum LeafKind {
    /// Class probabilities summing to one
    Distribution(usize),
    /// One finite value
    Value,
}

impl LeafKind {
    fn check(self, values: &[f64]) -> Result<()> {
        let expected = match self {
            LeafKind::Distribution(n_classes) => n_classes,
            LeafKind::Value => 1,
        };
        if values.len() != expected {
            anyhow::bail!("has {} values, expected {}", values.len(), expected);
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            anyhow::bail!("holds non-finite value {}", v);
        }
        if let LeafKind::Distribution(_) = self {
            if let Some(p) = values.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                anyhow::bail!("holds probability {} outside [0, 1]", p);
            }
            let total: f64 = values.iter().sum();
            if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
                anyhow::bail!("probabilities sum to {}", total);
            }
        }
        Ok(())
    }
}

impl DecisionTree {
    /// Index of the leaf node `features` reaches
    pub fn leaf_index(&self, features: &[f64]) -> usize {
        let mut idx = 0;
        while let TreeNode::Split { feature, threshold, left, right } = &self.nodes[idx] {
            idx = if features[*feature] <= *threshold { *left } else { *right };
        }
        idx
    }

    /// Walk from the root to the leaf for `features`
    pub fn leaf(&self, features: &[f64]) -> &[f64] {
        match &self.nodes[self.leaf_index(features)] {
            TreeNode::Leaf { values } => values,
            TreeNode::Split { .. } => &[],
        }
    }

    fn validate(&self, n_features: usize, leaf_kind: LeafKind) -> Result<()> {
        if self.nodes.is_empty() {
            anyhow::bail!("tree has no nodes");
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        anyhow::bail!(
                            "node {} splits on feature {} but the model has {} features",
                            idx, feature, n_features
                        );
                    }
                    if threshold.is_nan() {
                        anyhow::bail!("node {} has a NaN threshold", idx);
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            anyhow::bail!("node {} has invalid child index {}", idx, child);
                        }
                    }
                }
                TreeNode::Leaf { values } => {
                    leaf_kind
                        .check(values)
                        .map_err(|e| anyhow::anyhow!("leaf {} {}", idx, e))?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Averaged-probability random forest over integer class codes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_features: usize,
    /// Class codes, strictly ascending; leaf distributions follow this order
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl Classifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf(features)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }
}

impl ArtifactModel for RandomForestClassifier {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.n_features != n_features {
            anyhow::bail!(
                "classifier was fitted on {} features, expected {}",
                self.n_features, n_features
            );
        }
        if self.classes.is_empty() {
            anyhow::bail!("classifier has no classes");
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            anyhow::bail!("classifier classes must be strictly ascending: {:?}", self.classes);
        }
        if self.trees.is_empty() {
            anyhow::bail!("classifier has no trees");
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, LeafKind::Distribution(self.classes.len()))
                .map_err(|e| anyhow::anyhow!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

// ============================================================================
// Regressor
// ============================================================================

/// Mean-of-trees random forest regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl Regressor for RandomForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.leaf(features)[0]).sum();
        total / self.trees.len() as f64
    }
}

impl ArtifactModel for RandomForestRegressor {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.n_features != n_features {
            anyhow::bail!(
                "regressor was fitted on {} features, expected {}",
                self.n_features, n_features
            );
        }
        if self.trees.is_empty() {
            anyhow::bail!("regressor has no trees");
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, LeafKind::Value)
                .map_err(|e| anyhow::anyhow!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}
