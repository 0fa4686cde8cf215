//! Runtime configuration from environment variables
//!
//! | var                  | default                        |
//! |----------------------|--------------------------------|
//! | `ARTIFACT_DIR`       | `artifacts`                    |
//! | `PORT`               | `5000`                         |
//! | `CROP_DATASET`       | `data/crop_recommendation.csv` |
//! | `FERTILIZER_DATASET` | unset (skipped)                |
//! | `YIELD_DATASET`      | unset (skipped)                |

use std::path::PathBuf;

pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CROP_DATASET: &str = "data/crop_recommendation.csv";

/// `RUST_LOG` fallback for both binaries
pub const DEFAULT_LOG_FILTER: &str = "crop_advisor=info,tower_http=debug,axum=debug,warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub artifact_dir: PathBuf,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable `PORT` values fall back to the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let artifact_dir = lookup("ARTIFACT_DIR")
            .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string())
            .into();

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self { artifact_dir, port }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    pub artifact_dir: PathBuf,
    pub crop_dataset: PathBuf,
    pub fertilizer_dataset: Option<PathBuf>,
    pub yield_dataset: Option<PathBuf>,
}

impl TrainingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let optional_path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        Self {
            artifact_dir: lookup("ARTIFACT_DIR")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string())
                .into(),
            crop_dataset: lookup("CROP_DATASET")
                .unwrap_or_else(|| DEFAULT_CROP_DATASET.to_string())
                .into(),
            fertilizer_dataset: optional_path("FERTILIZER_DATASET"),
            yield_dataset: optional_path("YIELD_DATASET"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.artifact_dir, PathBuf::from("artifacts"));
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_server_overrides_and_bad_port() {
        let config = ServerConfig::from_lookup(lookup_from(&[("ARTIFACT_DIR", "/srv/models"), ("PORT", "8080")]));
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.port, 8080);

        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_training_optional_datasets() {
        let config = TrainingConfig::from_lookup(lookup_from(&[("YIELD_DATASET", "data/yield.csv"), ("FERTILIZER_DATASET", " ")]));
        assert_eq!(config.crop_dataset, PathBuf::from(DEFAULT_CROP_DATASET));
        assert_eq!(config.yield_dataset, Some(PathBuf::from("data/yield.csv")));
        assert_eq!(config.fertilizer_dataset, None);
    }
}
