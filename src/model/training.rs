//! Random Forest Fitting
//!
//! Each tree is a `linfa_trees` CART classifier (Gini impurity) fitted on a
//! bootstrap sample, restricted to a feature subset drawn for that tree. The
//! fitted tree is exported into the flat serving format and its leaves are
//! refilled by routing the tree's own sample through it: class frequencies
//! for classifiers, target means for regressors.
//!
//! Regression trees choose their splits by classifying the target into
//! quantile bins; only the leaf values see the raw targets.
//!
//! Trees are independent, so the forest is fitted in parallel; tree `i`
//! draws from its own RNG seeded with `seed + i`, which keeps a fit
//! reproducible regardless of thread count.

use anyhow::{Context, Result};
use linfa::prelude::{SingleTargetRegression, ToConfusionMatrix};
use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_trees::{DecisionTree as LinfaTree, DecisionTreeParams, SplitQuality, TreeNode as LinfaNode};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::utils::FittedScaler;

use super::forest::{DecisionTree, RandomForestClassifier, RandomForestRegressor, TreeNode};
use super::{Classifier, Regressor};

/// Upper bound on the quantile bins a regression target is split into
const MAX_TARGET_BINS: usize = 32;

/// Features sampled for each tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    All,
    Sqrt,
}

impl MaxFeatures {
    fn count(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows until the other stopping rules apply
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl ForestParams {
    /// Crop classifier settings
    pub fn crop() -> Self {
        Self {
            n_estimators: 30,
            max_depth: Some(8),
            min_samples_split: 10,
            min_samples_leaf: 5,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }

    /// Fertilizer classifier settings
    pub fn fertilizer() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }

    /// Yield regressor settings
    pub fn yield_regression() -> Self {
        Self {
            n_estimators: 200,
            max_depth: Some(15),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::crop()
    }
}

// ============================================================================
// Tree growth
// ============================================================================

/// What a tree is fitted against and what its leaves report
enum LeafTarget<'a> {
    /// Class index per row
    Classes { labels: &'a [usize], n_classes: usize },
    /// Raw target per row, plus its quantile bin and each bin's mean
    Values { values: &'a [f64], bins: &'a [usize], bin_means: &'a [f64] },
}

impl LeafTarget<'_> {
    /// Labels the linfa tree is fitted on
    fn fit_labels(&self) -> &[usize] {
        match self {
            LeafTarget::Classes { labels, .. } => labels,
            LeafTarget::Values { bins, .. } => bins,
        }
    }

    /// Leaf contents for the sample rows routed to it. An empty leaf falls
    /// back to linfa's own prediction for that node.
    fn leaf_values(&self, routed: &[usize], fallback: usize) -> Vec<f64> {
        match self {
            LeafTarget::Classes { labels, n_classes } => {
                let mut counts = vec![0.0; *n_classes];
                if routed.is_empty() {
                    if let Some(slot) = counts.get_mut(fallback) {
                        *slot = 1.0;
                    }
                    return counts;
                }
                for &row in routed {
                    counts[labels[row]] += 1.0;
                }
                let total = routed.len() as f64;
                counts.iter_mut().for_each(|c| *c /= total);
                counts
            }
            LeafTarget::Values { values, bin_means, .. } => {
                if routed.is_empty() {
                    return vec![bin_means.get(fallback).copied().unwrap_or_default()];
                }
                let sum: f64 = routed.iter().map(|&row| values[row]).sum();
                vec![sum / routed.len() as f64]
            }
        }
    }
}

fn tree_params(params: &ForestParams) -> DecisionTreeParams<f64, usize> {
    LinfaTree::<f64, usize>::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(params.max_depth)
        .min_weight_split(params.min_samples_split as f32)
        .min_weight_leaf(params.min_samples_leaf as f32)
}

fn grow_tree(
    rows: &[Vec<f64>],
    target: &LeafTarget,
    params: &ForestParams,
    n_features: usize,
    tree_idx: usize,
) -> Result<DecisionTree> {
    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
    let n = rows.len();
    let sample: Vec<usize> = if params.bootstrap {
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    } else {
        (0..n).collect()
    };
    let mut features =
        rand::seq::index::sample(&mut rng, n_features, params.max_features.count(n_features)).into_vec();
    features.sort_unstable();

    let records = Array2::from_shape_fn((sample.len(), features.len()), |(r, c)| rows[sample[r]][features[c]]);
    let fit_labels = target.fit_labels();
    let labels = Array1::from_iter(sample.iter().map(|&row| fit_labels[row]));

    let dataset = DatasetBase::from(records).with_targets(labels);
    let fitted = tree_params(params)
        .fit(&dataset)
        .with_context(|| format!("Failed to fit tree {}", tree_idx))?;

    let mut fallbacks = Vec::new();
    let mut tree = DecisionTree { nodes: Vec::new() };
    export_node(fitted.root_node(), &features, &mut tree.nodes, &mut fallbacks)?;

    let mut routed: Vec<Vec<usize>> = vec![Vec::new(); tree.nodes.len()];
    for &row in &sample {
        routed[tree.leaf_index(&rows[row])].push(row);
    }
    for (idx, node) in tree.nodes.iter_mut().enumerate() {
        if let TreeNode::Leaf { values } = node {
            *values = target.leaf_values(&routed[idx], fallbacks[idx]);
        }
    }
    Ok(tree)
}

/// Append `node` and its subtree in pre-order, mapping linfa's column
/// indices back through `features`. Leaves are left empty; `fallbacks`
/// records linfa's label for each node.
fn export_node(
    node: &LinfaNode<f64, usize>,
    features: &[usize],
    nodes: &mut Vec<TreeNode>,
    fallbacks: &mut Vec<usize>,
) -> Result<usize> {
    let idx = nodes.len();
    nodes.push(TreeNode::Leaf { values: Vec::new() });
    fallbacks.push(node.prediction().unwrap_or_default());
    if node.is_leaf() {
        return Ok(idx);
    }

    let children = node.children();
    let (Some(left), Some(right)) = (
        children.first().and_then(|child| child.as_deref()),
        children.get(1).and_then(|child| child.as_deref()),
    ) else {
        anyhow::bail!("Fitted tree has a split without two children");
    };
    let (column, threshold, _) = node.split();
    let feature = *features
        .get(column)
        .with_context(|| format!("Fitted tree splits on unknown column {}", column))?;

    let left = export_node(left, features, nodes, fallbacks)?;
    let right = export_node(right, features, nodes, fallbacks)?;
    nodes[idx] = TreeNode::Split { feature, threshold, left, right };
    Ok(idx)
}

fn check_dataset(rows: &[Vec<f64>], n_targets: usize, params: &ForestParams) -> Result<usize> {
    if rows.is_empty() {
        anyhow::bail!("Cannot fit a forest on an empty dataset");
    }
    if rows.len() != n_targets {
        anyhow::bail!("{} rows but {} targets", rows.len(), n_targets);
    }
    if params.n_estimators == 0 {
        anyhow::bail!("n_estimators must be at least 1");
    }
    let n_features = rows[0].len();
    if n_features == 0 {
        anyhow::bail!("Rows have no features");
    }
    if let Some(idx) = rows.iter().position(|r| r.len() != n_features) {
        anyhow::bail!("Row {} has {} values, expected {}", idx, rows[idx].len(), n_features);
    }
    Ok(n_features)
}

fn grow_forest(
    rows: &[Vec<f64>],
    target: &LeafTarget,
    params: &ForestParams,
    n_features: usize,
) -> Result<Vec<DecisionTree>> {
    (0..params.n_estimators)
        .into_par_iter()
        .map(|tree_idx| grow_tree(rows, target, params, n_features, tree_idx))
        .collect()
}

/// Bin per target (by quantile of the distinct values) and the mean of each bin
fn quantile_bins(targets: &[f64], max_bins: usize) -> (Vec<usize>, Vec<f64>) {
    let mut distinct = targets.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    let n_bins = distinct.len().min(max_bins).max(1);
    // Lower edge of bins 1..n_bins; strictly increasing since n_bins <= distinct.len()
    let edges: Vec<f64> = (1..n_bins).map(|b| distinct[b * distinct.len() / n_bins]).collect();
    let bins: Vec<usize> = targets.iter().map(|y| edges.partition_point(|edge| edge <= y)).collect();

    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];
    for (&bin, &y) in bins.iter().zip(targets) {
        sums[bin] += y;
        counts[bin] += 1;
    }
    let means = sums
        .iter()
        .zip(&counts)
        .map(|(sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
        .collect();
    (bins, means)
}

/// Fit a classifier on integer class codes
pub fn fit_classifier(rows: &[Vec<f64>], labels: &[i64], params: &ForestParams) -> Result<RandomForestClassifier> {
    let n_features = check_dataset(rows, labels.len(), params)?;

    let mut classes = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let label_idx: Vec<usize> = labels
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or_default())
        .collect();
    let target = LeafTarget::Classes { labels: &label_idx, n_classes: classes.len() };

    let trees = grow_forest(rows, &target, params, n_features)?;
    Ok(RandomForestClassifier { n_features, classes, trees })
}

pub fn fit_regressor(rows: &[Vec<f64>], targets: &[f64], params: &ForestParams) -> Result<RandomForestRegressor> {
    let n_features = check_dataset(rows, targets.len(), params)?;
    if targets.iter().any(|y| !y.is_finite()) {
        anyhow::bail!("Regression targets must be finite");
    }

    let (bins, bin_means) = quantile_bins(targets, MAX_TARGET_BINS);
    let target = LeafTarget::Values { values: targets, bins: &bins, bin_means: &bin_means };
    let trees = grow_forest(rows, &target, params, n_features)?;
    Ok(RandomForestRegressor { n_features, trees })
}

// ============================================================================
// Evaluation helpers
// ============================================================================

/// Rows and targets as a linfa dataset
pub type Samples<T> = DatasetBase<Array2<f64>, Array1<T>>;

pub fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

/// Rows of `order`, in that order, as a dataset
fn dataset_in_order<T: Copy>(rows: &[Vec<f64>], targets: &[T], order: &[usize]) -> Result<Samples<T>> {
    if rows.len() != targets.len() {
        anyhow::bail!("{} rows but {} targets", rows.len(), targets.len());
    }
    let width = rows.first().map_or(0, Vec::len);
    let flat: Vec<f64> = order.iter().flat_map(|&i| rows[i].iter().copied()).collect();
    let records = Array2::from_shape_vec((order.len(), width), flat).context("Rows differ in width")?;
    Ok(DatasetBase::from(records).with_targets(Array1::from(select(targets, order))))
}

/// Shuffle, then split off the trailing `test_fraction` of rows as (train, test)
pub fn shuffled_split<T: Copy>(
    rows: &[Vec<f64>],
    targets: &[T],
    test_fraction: f32,
    seed: u64,
) -> Result<(Samples<T>, Samples<T>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        anyhow::bail!("test fraction {} is outside [0, 1)", test_fraction);
    }
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let dataset = dataset_in_order(rows, targets, &order)?;
    Ok(dataset.split_with_ratio(1.0 - test_fraction))
}

/// Dataset records back as owned rows
pub fn rows_of(records: &Array2<f64>) -> Vec<Vec<f64>> {
    records.outer_iter().map(|row| row.to_vec()).collect()
}

/// Scaled train/test rows and the scaler that produced them
pub struct ScaledSplit<T> {
    pub scaler: FittedScaler,
    pub train_rows: Vec<Vec<f64>>,
    pub train_targets: Vec<T>,
    pub test_rows: Vec<Vec<f64>>,
    pub test_targets: Vec<T>,
}

/// Shuffled split, then a min-max scaler fitted on the training rows alone
/// and applied to both sides
pub fn split_and_scale<T: Copy>(
    feature_names: &[&str],
    rows: &[Vec<f64>],
    targets: &[T],
    test_fraction: f32,
    seed: u64,
) -> Result<ScaledSplit<T>> {
    let (train, test) = shuffled_split(rows, targets, test_fraction, seed)?;
    let train_rows = rows_of(&train.records);
    let scaler = FittedScaler::fit_min_max(feature_names, &train_rows)?;

    Ok(ScaledSplit {
        train_rows: scaler.transform_rows(&train_rows),
        train_targets: train.targets.to_vec(),
        test_rows: scaler.transform_rows(&rows_of(&test.records)),
        test_targets: test.targets.to_vec(),
        scaler,
    })
}

/// Fraction of rows whose predicted class matches the label
pub fn accuracy<C: Classifier + ?Sized>(model: &C, rows: &[Vec<f64>], labels: &[i64]) -> Result<f32> {
    if rows.is_empty() {
        return Ok(0.0);
    }
    // Labels the model never saw share one index past its classes
    let classes = model.classes();
    let index_of = |code: i64| classes.binary_search(&code).unwrap_or(classes.len());

    let predicted: Vec<usize> = rows.par_iter().map(|row| index_of(model.predict(row))).collect();
    let predicted = Array1::from(predicted);
    let truth = Array1::from_iter(labels.iter().map(|&label| index_of(label)));

    let matrix = predicted.confusion_matrix(&truth)?;
    Ok(matrix.accuracy())
}

/// Coefficient of determination
pub fn r2_score<R: Regressor + ?Sized>(model: &R, rows: &[Vec<f64>], targets: &[f64]) -> Result<f64> {
    if targets.is_empty() {
        return Ok(0.0);
    }
    let predicted = Array1::from_iter(rows.iter().map(|row| model.predict(row)));
    let truth = Array1::from(targets.to_vec());
    Ok(predicted.r2(&truth)?)
}

/// Row order whose `k` contiguous chunks each hold a near-equal share of
/// every class
fn stratified_order(labels: &[i64], k: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    order.sort_by_key(|&i| labels[i]);

    let mut chunked = Vec::with_capacity(order.len());
    for chunk in 0..k {
        chunked.extend(order.iter().skip(chunk).step_by(k).copied());
    }
    chunked
}

/// Held-out accuracy of each of `k` stratified folds
pub fn cross_val_accuracy(
    rows: &[Vec<f64>],
    labels: &[i64],
    params: &ForestParams,
    k: usize,
    seed: u64,
) -> Result<Vec<f32>> {
    if k < 2 || k > rows.len() {
        anyhow::bail!("Cannot split {} rows into {} folds", rows.len(), k);
    }
    let order = stratified_order(labels, k, seed);
    let dataset = dataset_in_order(rows, labels, &order)?;

    dataset
        .fold(k)
        .into_iter()
        .map(|(train, valid)| {
            let model = fit_classifier(&rows_of(&train.records), &train.targets.to_vec(), params)?;
            accuracy(&model, &rows_of(&valid.records), &valid.targets.to_vec())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactModel;
    use approx::assert_relative_eq;

    fn exact_params() -> ForestParams {
        ForestParams {
            n_estimators: 3,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: false,
            seed: 7,
        }
    }

    fn step_data() -> (Vec<Vec<f64>>, Vec<i64>) {
        let rows: Vec<Vec<f64>> = (0..20).map(|x| vec![x as f64, (x % 3) as f64]).collect();
        let labels: Vec<i64> = (0..20).map(|x| if x < 10 { 4 } else { 9 }).collect();
        (rows, labels)
    }

    #[test]
    fn test_classifier_separates_step() {
        let (rows, labels) = step_data();
        let model = fit_classifier(&rows, &labels, &exact_params()).unwrap();

        assert_eq!(model.classes, vec![4, 9]);
        assert!(model.validate(2).is_ok());
        assert_relative_eq!(accuracy(&model, &rows, &labels).unwrap(), 1.0);
        assert_eq!(model.predict(&[9.0, 0.0]), 4);
        assert_eq!(model.predict(&[10.0, 0.0]), 9);
    }

    #[test]
    fn test_exported_split_keeps_feature_index() {
        // Only column 1 separates the classes
        let rows: Vec<Vec<f64>> = (0..12).map(|x| vec![(x % 4) as f64, x as f64]).collect();
        let labels: Vec<i64> = (0..12).map(|x| if x < 6 { 1 } else { 2 }).collect();
        let model = fit_classifier(&rows, &labels, &exact_params()).unwrap();

        match &model.trees[0].nodes[0] {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 1);
                assert!(*threshold > 5.0 && *threshold < 6.0);
            }
            other => panic!("expected a split at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_leaf_distributions_are_routed_frequencies() {
        let (rows, labels) = step_data();
        let model = fit_classifier(&rows, &labels, &ForestParams { n_estimators: 5, ..ForestParams::crop() }).unwrap();
        assert!(model.validate(2).is_ok());

        for tree in &model.trees {
            for node in &tree.nodes {
                if let TreeNode::Leaf { values } = node {
                    assert_relative_eq!(values.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
                }
            }
        }
        for row in &rows {
            let total: f64 = model.predict_proba(row).iter().sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_min_samples_leaf_keeps_leaves_mixed() {
        // One leaf must hold 5 rows, so the 3-row minority cannot be isolated
        let rows: Vec<Vec<f64>> = (0..10).map(|x| vec![x as f64]).collect();
        let labels: Vec<i64> = (0..10).map(|x| if x < 3 { 0 } else { 1 }).collect();
        let params = ForestParams {
            min_samples_split: 10,
            min_samples_leaf: 5,
            ..exact_params()
        };
        let model = fit_classifier(&rows, &labels, &params).unwrap();

        let proba = model.predict_proba(&[0.0]);
        assert!(proba[0] > 0.0 && proba[0] < 1.0);
    }

    #[test]
    fn test_fit_is_reproducible_for_a_seed() {
        let (rows, labels) = step_data();
        let params = ForestParams { n_estimators: 8, min_samples_split: 2, min_samples_leaf: 1, ..ForestParams::crop() };
        let a = fit_classifier(&rows, &labels, &params).unwrap();
        let b = fit_classifier(&rows, &labels, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_regressor_fits_step_means() {
        let rows: Vec<Vec<f64>> = (0..10).map(|x| vec![x as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|x| if x < 5 { 10.0 } else { 30.0 }).collect();
        let model = fit_regressor(&rows, &targets, &exact_params()).unwrap();

        assert!(model.validate(1).is_ok());
        assert_relative_eq!(model.predict(&[2.0]), 10.0, epsilon = 1e-9);
        assert_relative_eq!(model.predict(&[7.0]), 30.0, epsilon = 1e-9);
        assert_relative_eq!(r2_score(&model, &rows, &targets).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quantile_bins_are_ordered() {
        let targets = [5.0, 1.0, 3.0, 1.0, 9.0, 7.0];
        let (bins, means) = quantile_bins(&targets, 3);
        assert_eq!(means.len(), 3);
        assert_eq!(bins, vec![1, 0, 1, 0, 2, 2]);
        assert_relative_eq!(means[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(means[1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(means[2], 8.0, epsilon = 1e-12);

        let (bins, means) = quantile_bins(&[2.0, 2.0], MAX_TARGET_BINS);
        assert_eq!(bins, vec![0, 0]);
        assert_eq!(means, vec![2.0]);
    }

    #[test]
    fn test_rejects_mismatched_inputs() {
        assert!(fit_classifier(&[], &[], &exact_params()).is_err());
        assert!(fit_classifier(&[vec![1.0]], &[1, 2], &exact_params()).is_err());
        assert!(fit_regressor(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0], &exact_params()).is_err());
        assert!(fit_regressor(&[vec![1.0]], &[f64::NAN], &exact_params()).is_err());
    }

    #[test]
    fn test_shuffled_split_is_a_partition() {
        let rows: Vec<Vec<f64>> = (0..10).map(|x| vec![x as f64]).collect();
        let ids: Vec<i64> = (0..10).collect();
        let (train, test) = shuffled_split(&rows, &ids, 0.2, 42).unwrap();

        assert!((1..=3).contains(&test.targets.len()));
        let mut all: Vec<i64> = train.targets.iter().chain(test.targets.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, ids);

        // Records stay aligned with their targets
        for (row, id) in rows_of(&train.records).iter().zip(train.targets.iter()) {
            assert_eq!(row[0], *id as f64);
        }

        let (again, _) = shuffled_split(&rows, &ids, 0.2, 42).unwrap();
        assert_eq!(again.targets, train.targets);
    }

    #[test]
    fn test_scaler_is_fitted_on_training_rows_only() {
        let rows: Vec<Vec<f64>> = (0..10).map(|x| vec![x as f64]).collect();
        let ids: Vec<i64> = (0..10).collect();

        // A seed that holds out the largest row
        let seed = (0..200u64)
            .find(|&seed| {
                let (_, test) = shuffled_split(&rows, &ids, 0.2, seed).unwrap();
                test.targets.iter().any(|&id| id == 9)
            })
            .unwrap();
        let split = split_and_scale(&["x"], &rows, &ids, 0.2, seed).unwrap();

        let train_max = *split.train_targets.iter().max().unwrap() as f64;
        let train_min = *split.train_targets.iter().min().unwrap() as f64;
        for (row, id) in split.test_rows.iter().zip(&split.test_targets) {
            let expected = (*id as f64 - train_min) / (train_max - train_min);
            assert_relative_eq!(row[0], expected, epsilon = 1e-12);
        }
        let held_out = split.test_targets.iter().position(|&id| id == 9).unwrap();
        assert!(split.test_rows[held_out][0] > 1.0);
        assert!(split.train_rows.iter().all(|row| (0.0..=1.0).contains(&row[0])));
    }

    #[test]
    fn test_accuracy_counts_unseen_labels_as_misses() {
        let (rows, labels) = step_data();
        let model = fit_classifier(&rows, &labels, &exact_params()).unwrap();

        let mut relabelled = labels.clone();
        relabelled[0] = 99;
        relabelled[1] = 99;
        assert_relative_eq!(accuracy(&model, &rows, &relabelled).unwrap(), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_stratified_order_balances_chunks() {
        let (_, labels) = step_data();
        let order = stratified_order(&labels, 5, 3);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());

        for chunk in order.chunks(4) {
            let fours = chunk.iter().filter(|&&i| labels[i] == 4).count();
            assert_eq!(fours, 2);
        }
    }

    #[test]
    fn test_cross_val_reports_each_fold() {
        let (rows, labels) = step_data();
        let scores = cross_val_accuracy(&rows, &labels, &exact_params(), 5, 42).unwrap();

        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        let mean = scores.iter().sum::<f32>() / scores.len() as f32;
        assert!(mean >= 0.75);

        assert!(cross_val_accuracy(&rows, &labels, &exact_params(), 1, 42).is_err());
        assert!(cross_val_accuracy(&rows[..3], &labels[..3], &exact_params(), 5, 42).is_err());
    }
}
