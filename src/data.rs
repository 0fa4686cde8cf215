//! Training Data Loading
//!
//! Reads the crop, fertilizer and yield CSV datasets with Polars and turns
//! them into row-major feature matrices in the same column order the
//! request encoder produces.
//!
//! Cleaning rules:
//! - Rows whose target is missing or not in the label table are dropped
//! - Missing or unrecognised feature cells are imputed with the column mean

use anyhow::{Context, Result};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use crate::encoding::{CategoryTable, EncodingTables, KeyCase, UNKNOWN_CODE};

/// Source columns of the crop dataset, in `CROP_FEATURES` order
pub const CROP_DATASET_COLUMNS: [&str; 12] = [
    "N", "P", "K", "temperature", "humidity", "ph", "rainfall",
    "Soil", "prev_crop", "prev_num", "season", "rec_num",
];
pub const CROP_LABEL_COLUMN: &str = "label";

/// Source columns of the yield dataset, in `YIELD_FEATURES` order
pub const YIELD_DATASET_COLUMNS: [&str; 12] = [
    "N", "P", "K", "temperature", "humidity", "ph", "rainfall",
    "Soil", "season", "prev_crop", "prev_num", "crop",
];
pub const YIELD_TARGET_COLUMN: &str = "yield";

/// Source columns of the fertilizer dataset, in `FERTILIZER_FEATURES` order
pub const FERTILIZER_DATASET_COLUMNS: [&str; 6] = ["N", "P", "K", "Soil", "Temperature", "Crop"];
pub const FERTILIZER_LABEL_COLUMN: &str = "Fertilizer";

/// Feature matrix with integer class labels
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationData {
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionData {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Fertilizer data plus the label-encoder classes fitted on it
#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerData {
    pub data: ClassificationData,
    pub soil_labels: Vec<String>,
    pub crop_labels: Vec<String>,
    pub fertilizer_labels: Vec<String>,
}

/// Read a CSV file with a header row
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

/// Fail with the available columns if any required column is absent
pub fn require_columns(df: &DataFrame, columns: &[&str], context: &str) -> Result<()> {
    let actual: HashSet<&str> = df.get_column_names().into_iter().map(|s| s.as_str()).collect();

    for &expected in columns {
        if !actual.contains(expected) {
            anyhow::bail!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context, expected, actual
            );
        }
    }
    Ok(())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;

    let values = column
        .f64()
        .with_context(|| format!("Column '{}' is not f64 after cast", name))?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(values)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;

    let values = column
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect();
    Ok(values)
}

/// Codes for a text column; unknown values become missing
fn coded_column(df: &DataFrame, name: &str, encode: impl Fn(&str) -> i64) -> Result<Vec<Option<f64>>> {
    Ok(text_column(df, name)?
        .into_iter()
        .map(|v| v.map(|s| encode(&s)).filter(|&code| code != UNKNOWN_CODE).map(|code| code as f64))
        .collect())
}

/// Replace missing cells with their column mean (0 for an all-missing column)
pub fn impute_column_means(columns: Vec<Vec<Option<f64>>>) -> Vec<Vec<f64>> {
    columns
        .into_iter()
        .map(|column| {
            let present: Vec<f64> = column.iter().flatten().copied().collect();
            let mean = if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            };
            column.into_iter().map(|v| v.unwrap_or(mean)).collect()
        })
        .collect()
}

/// Column-major to row-major, keeping only `keep` rows
fn to_rows(columns: &[Vec<f64>], keep: &[usize]) -> Vec<Vec<f64>> {
    keep.iter()
        .map(|&row| columns.iter().map(|column| column[row]).collect())
        .collect()
}

/// Columns for the shared crop/yield layout: seven numeric, then coded
///
/// Durations are coded strictly here: only "short" and "long" are known, so
/// anything else is imputed rather than read as short.
fn site_columns(
    df: &DataFrame,
    categorical: &[(&str, &CategoryTable)],
) -> Result<Vec<Vec<Option<f64>>>> {
    let mut columns = Vec::with_capacity(7 + categorical.len());
    for name in &CROP_DATASET_COLUMNS[..7] {
        columns.push(numeric_column(df, name)?);
    }
    for &(name, table) in categorical {
        columns.push(coded_column(df, name, |v| table.code(v))?);
    }
    Ok(columns)
}

/// Crop dataset: features in `CROP_FEATURES` order, labels as crop codes
pub fn load_crop_dataset(path: &Path, tables: &EncodingTables) -> Result<ClassificationData> {
    let df = read_csv(path)?;
    require_columns(&df, &CROP_DATASET_COLUMNS, "crop dataset")?;
    require_columns(&df, &[CROP_LABEL_COLUMN], "crop dataset")?;

    let columns = site_columns(
        &df,
        &[
            ("Soil", &tables.soil),
            ("prev_crop", &tables.crop),
            ("prev_num", &tables.duration),
            ("season", &tables.season),
            ("rec_num", &tables.duration),
        ],
    )?;

    let raw_labels = coded_column(&df, CROP_LABEL_COLUMN, |v| tables.crop.code(v))?;
    let keep: Vec<usize> = (0..raw_labels.len()).filter(|&i| raw_labels[i].is_some()).collect();
    let dropped = raw_labels.len() - keep.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} crop rows with missing or unknown labels", dropped);
    }

    let columns = impute_column_means(columns);
    let rows = to_rows(&columns, &keep);
    let labels = keep.iter().filter_map(|&i| raw_labels[i]).map(|code| code as i64).collect();

    tracing::info!("Loaded crop dataset: {} rows from {:?}", keep.len(), path);
    Ok(ClassificationData { rows, labels })
}

/// Yield dataset: features in `YIELD_FEATURES` order, targets in q/ha
pub fn load_yield_dataset(path: &Path, tables: &EncodingTables) -> Result<RegressionData> {
    let df = read_csv(path)?;
    require_columns(&df, &YIELD_DATASET_COLUMNS, "yield dataset")?;
    require_columns(&df, &[YIELD_TARGET_COLUMN], "yield dataset")?;

    let columns = site_columns(
        &df,
        &[
            ("Soil", &tables.soil),
            ("season", &tables.season),
            ("prev_crop", &tables.crop),
            ("prev_num", &tables.duration),
            ("crop", &tables.crop),
        ],
    )?;

    let raw_targets = numeric_column(&df, YIELD_TARGET_COLUMN)?;
    let keep: Vec<usize> = (0..raw_targets.len()).filter(|&i| raw_targets[i].is_some()).collect();
    if keep.len() < raw_targets.len() {
        tracing::warn!("Dropped {} yield rows with missing targets", raw_targets.len() - keep.len());
    }

    let columns = impute_column_means(columns);
    let rows = to_rows(&columns, &keep);
    let targets = keep.iter().filter_map(|&i| raw_targets[i]).collect();

    tracing::info!("Loaded yield dataset: {} rows from {:?}", keep.len(), path);
    Ok(RegressionData { rows, targets })
}

/// Sorted distinct values, label-encoder style
fn distinct_labels(values: &[Option<String>]) -> Vec<String> {
    let mut labels: Vec<String> = values.iter().flatten().cloned().collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Fertilizer dataset: soil, crop and fertilizer are label-encoded from the data
///
/// Rows missing any of the three are dropped.
pub fn load_fertilizer_dataset(path: &Path) -> Result<FertilizerData> {
    let df = read_csv(path)?;
    require_columns(&df, &FERTILIZER_DATASET_COLUMNS, "fertilizer dataset")?;
    require_columns(&df, &[FERTILIZER_LABEL_COLUMN], "fertilizer dataset")?;

    let soils = text_column(&df, "Soil")?;
    let crops = text_column(&df, "Crop")?;
    let fertilizers = text_column(&df, FERTILIZER_LABEL_COLUMN)?;

    let keep: Vec<usize> = (0..df.height())
        .filter(|&i| soils[i].is_some() && crops[i].is_some() && fertilizers[i].is_some())
        .collect();
    if keep.len() < df.height() {
        tracing::warn!("Dropped {} fertilizer rows with missing categories", df.height() - keep.len());
    }

    let soil_labels = distinct_labels(&soils);
    let crop_labels = distinct_labels(&crops);
    let fertilizer_labels = distinct_labels(&fertilizers);
    let soil_table = CategoryTable::from_labels("soil type", KeyCase::Exact, &soil_labels);
    let crop_table = CategoryTable::from_labels("crop", KeyCase::Exact, &crop_labels);
    let fertilizer_table = CategoryTable::from_labels("fertilizer", KeyCase::Exact, &fertilizer_labels);

    let encode = |values: &[Option<String>], table: &CategoryTable| -> Vec<Option<f64>> {
        values
            .iter()
            .map(|v| v.as_deref().map(|s| table.code(s) as f64))
            .collect()
    };

    let columns = impute_column_means(vec![
        numeric_column(&df, "N")?,
        numeric_column(&df, "P")?,
        numeric_column(&df, "K")?,
        encode(&soils, &soil_table),
        numeric_column(&df, "Temperature")?,
        encode(&crops, &crop_table),
    ]);

    let rows = to_rows(&columns, &keep);
    let labels = keep
        .iter()
        .filter_map(|&i| fertilizers[i].as_deref())
        .map(|name| fertilizer_table.code(name))
        .collect();

    tracing::info!(
        "Loaded fertilizer dataset: {} rows, {} fertilizers from {:?}",
        keep.len(),
        fertilizer_labels.len(),
        path
    );
    Ok(FertilizerData {
        data: ClassificationData { rows, labels },
        soil_labels,
        crop_labels,
        fertilizer_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_crop_dataset_encodes_and_drops_unknown_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "crop.csv",
            "N,P,K,temperature,humidity,ph,rainfall,Soil,prev_crop,prev_num,season,rec_num,label\n\
             90,42,43,20.8,82,6.5,202.9,Clayey,wheat,short,Kharif,short,rice\n\
             60,55,44,23.0,82.3,7.8,263.9,Loam,rice,long,Rabi,long,maize\n\
             50,40,40,25.0,60,6.5,100,Sandy,rice,short,Kharif,short,quinoa\n",
        );

        let data = load_crop_dataset(&path, &EncodingTables::new()).unwrap();
        assert_eq!(data.labels, vec![1, 2]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(&data.rows[0][7..], &[1.0, 24.0, 0.0, 1.0, 0.0]);
        assert_eq!(&data.rows[1][7..], &[3.0, 1.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_unknown_categories_are_mean_imputed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "crop.csv",
            "N,P,K,temperature,humidity,ph,rainfall,Soil,prev_crop,prev_num,season,rec_num,label\n\
             90,42,43,20,82,6.5,202,Clayey,rice,short,Kharif,short,rice\n\
             ,42,43,20,82,6.5,202,Gravel,rice,short,Kharif,short,rice\n\
             60,42,43,20,82,6.5,202,Sandy,rice,short,Kharif,short,rice\n",
        );

        let data = load_crop_dataset(&path, &EncodingTables::new()).unwrap();
        assert_relative_eq!(data.rows[1][0], 75.0);
        assert_relative_eq!(data.rows[1][7], 1.5);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "crop.csv", "N,P,K\n1,2,3\n");

        let err = load_crop_dataset(&path, &EncodingTables::new()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_fertilizer_dataset_label_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "fertilizer.csv",
            "N,P,K,Soil,Temperature,Crop,Fertilizer\n\
             37,0,0,Sandy,26,Maize,Urea\n\
             12,36,0,Loamy,29,Sugarcane,DAP\n\
             7,30,9,Black,34,Cotton,\n",
        );

        let fert = load_fertilizer_dataset(&path).unwrap();
        assert_eq!(fert.soil_labels, vec!["Black", "Loamy", "Sandy"]);
        assert_eq!(fert.crop_labels, vec!["Cotton", "Maize", "Sugarcane"]);
        assert_eq!(fert.fertilizer_labels, vec!["DAP", "Urea"]);
        assert_eq!(fert.data.labels, vec![1, 0]);
        assert_eq!(fert.data.rows[0], vec![37.0, 0.0, 0.0, 2.0, 26.0, 1.0]);
    }

    #[test]
    fn test_yield_dataset_drops_missing_targets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "yield.csv",
            "N,P,K,temperature,humidity,ph,rainfall,Soil,season,prev_crop,prev_num,crop,yield\n\
             50,40,40,25,60,6.5,100,Loam,Rabi,maize,short,wheat,32.5\n\
             50,40,40,25,60,6.5,100,Loam,Rabi,maize,short,wheat,\n",
        );

        let data = load_yield_dataset(&path, &EncodingTables::new()).unwrap();
        assert_eq!(data.targets, vec![32.5]);
        assert_eq!(&data.rows[0][7..], &[3.0, 2.0, 2.0, 0.0, 24.0]);
    }

    #[test]
    fn test_impute_all_missing_column() {
        let out = impute_column_means(vec![vec![None, None], vec![Some(2.0), None]]);
        assert_eq!(out, vec![vec![0.0, 0.0], vec![2.0, 2.0]]);
    }
}
