// Model Training Binary
//
// Purpose: Fit the crop, fertilizer and yield forests from CSV datasets and
// write the JSON artifacts the API server loads.
// Usage: CROP_DATASET=data/crop.csv YIELD_DATASET=data/yield.csv \
//        cargo run --release --bin train_models

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crop_advisor::config::{TrainingConfig, DEFAULT_LOG_FILTER};
use crop_advisor::data::{load_crop_dataset, load_fertilizer_dataset, load_yield_dataset};
use crop_advisor::encoding::{EncodingTables, CROP_FEATURES, FERTILIZER_FEATURES, YIELD_FEATURES};
use crop_advisor::model::training::{
    accuracy, cross_val_accuracy, fit_classifier, fit_regressor, r2_score, rows_of, shuffled_split,
    split_and_scale,
};
use crop_advisor::model::{
    ForestParams, ModelArtifact, CROP_MODEL_FILE, CROP_SCALER_FILE, FERTILIZER_MODEL_FILE,
    YIELD_MODEL_FILE, YIELD_SCALER_FILE,
};

const TEST_FRACTION: f32 = 0.2;
const SPLIT_SEED: u64 = 42;
const CV_FOLDS: usize = 5;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TrainingConfig::from_env();
    tracing::info!("Configuration:");
    tracing::info!("  ARTIFACT_DIR: {:?}", config.artifact_dir);
    tracing::info!("  CROP_DATASET: {:?}", config.crop_dataset);
    tracing::info!("  FERTILIZER_DATASET: {:?}", config.fertilizer_dataset);
    tracing::info!("  YIELD_DATASET: {:?}", config.yield_dataset);

    std::fs::create_dir_all(&config.artifact_dir)
        .with_context(|| format!("Failed to create artifact directory {:?}", config.artifact_dir))?;

    let tables = EncodingTables::new();

    train_crop_model(&config.crop_dataset, &config.artifact_dir, &tables)?;

    match &config.fertilizer_dataset {
        Some(path) => train_fertilizer_model(path, &config.artifact_dir)?,
        None => tracing::warn!("FERTILIZER_DATASET not set; skipping fertilizer model"),
    }

    match &config.yield_dataset {
        Some(path) => train_yield_model(path, &config.artifact_dir, &tables)?,
        None => tracing::warn!("YIELD_DATASET not set; skipping yield model"),
    }

    tracing::info!("All artifacts written to {:?}", config.artifact_dir);
    Ok(())
}

fn train_crop_model(dataset: &Path, out_dir: &Path, tables: &EncodingTables) -> Result<()> {
    let start = Instant::now();
    let data = load_crop_dataset(dataset, tables)?;

    let split = split_and_scale(&CROP_FEATURES, &data.rows, &data.labels, TEST_FRACTION, SPLIT_SEED)?;

    let params = ForestParams::crop();
    report_cross_validation("Crop", &split.train_rows, &split.train_targets, &params)?;

    let model = fit_classifier(&split.train_rows, &split.train_targets, &params)?;
    let score = accuracy(&model, &split.test_rows, &split.test_targets)?;
    tracing::info!(
        "Crop model: {} trees, {} classes, held-out accuracy {:.3} ({:.2?})",
        model.trees.len(),
        model.classes.len(),
        score,
        start.elapsed()
    );

    ModelArtifact::new(&CROP_FEATURES, model).save(&out_dir.join(CROP_MODEL_FILE))?;
    split.scaler.save(&out_dir.join(CROP_SCALER_FILE))?;
    Ok(())
}

/// Unscaled; the artifact carries the soil, crop and fertilizer label encoders
fn train_fertilizer_model(dataset: &Path, out_dir: &Path) -> Result<()> {
    let start = Instant::now();
    let fertilizer = load_fertilizer_dataset(dataset)?;
    let data = &fertilizer.data;

    let (train, test) = shuffled_split(&data.rows, &data.labels, TEST_FRACTION, SPLIT_SEED)?;
    let train_rows = rows_of(&train.records);
    let train_labels = train.targets.to_vec();

    let params = ForestParams::fertilizer();
    report_cross_validation("Fertilizer", &train_rows, &train_labels, &params)?;

    let model = fit_classifier(&train_rows, &train_labels, &params)?;
    let score = accuracy(&model, &rows_of(&test.records), &test.targets.to_vec())?;
    tracing::info!(
        "Fertilizer model: {} trees, {} fertilizers, held-out accuracy {:.3} ({:.2?})",
        model.trees.len(),
        fertilizer.fertilizer_labels.len(),
        score,
        start.elapsed()
    );

    ModelArtifact::new(&FERTILIZER_FEATURES, model)
        .with_encoder("soil", fertilizer.soil_labels)
        .with_encoder("crop", fertilizer.crop_labels)
        .with_encoder("fertilizer", fertilizer.fertilizer_labels)
        .save(&out_dir.join(FERTILIZER_MODEL_FILE))
}

fn train_yield_model(dataset: &Path, out_dir: &Path, tables: &EncodingTables) -> Result<()> {
    let start = Instant::now();
    let data = load_yield_dataset(dataset, tables)?;

    let split = split_and_scale(&YIELD_FEATURES, &data.rows, &data.targets, TEST_FRACTION, SPLIT_SEED)?;

    let params = ForestParams::yield_regression();
    let model = fit_regressor(&split.train_rows, &split.train_targets, &params)?;

    let r2 = r2_score(&model, &split.test_rows, &split.test_targets)?;
    tracing::info!(
        "Yield model: {} trees, held-out R² {:.3} ({:.2?})",
        model.trees.len(),
        r2,
        start.elapsed()
    );

    ModelArtifact::new(&YIELD_FEATURES, model).save(&out_dir.join(YIELD_MODEL_FILE))?;
    split.scaler.save(&out_dir.join(YIELD_SCALER_FILE))?;
    Ok(())
}

/// Log per-fold and mean stratified k-fold accuracy on the training split
fn report_cross_validation(name: &str, rows: &[Vec<f64>], labels: &[i64], params: &ForestParams) -> Result<()> {
    if rows.len() < CV_FOLDS {
        tracing::warn!("{} model: {} training rows, skipping {}-fold CV", name, rows.len(), CV_FOLDS);
        return Ok(());
    }
    let scores = cross_val_accuracy(rows, labels, params, CV_FOLDS, SPLIT_SEED)?;
    let mean = scores.iter().sum::<f32>() / scores.len() as f32;
    tracing::info!("{} model: {}-fold CV accuracy {:.3} (folds {:.3?})", name, CV_FOLDS, mean, scores);
    Ok(())
}
