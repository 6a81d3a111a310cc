use std::fs;
use std::path::Path;

use cinefit_core::{CineError, CineResult};
use serde::{Deserialize, Serialize};

/// Ridge regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeParams {
    pub alpha: f64,
}

impl Default for RidgeParams {
    fn default() -> Self {
        RidgeParams { alpha: 1.0 }
    }
}

/// Lasso regression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LassoParams {
    pub alpha: f64,
    pub max_iter: usize,
}

impl Default for LassoParams {
    fn default() -> Self {
        LassoParams {
            alpha: 0.1,
            max_iter: 1000,
        }
    }
}

/// Random forest settings. `max_depth = None` grows trees until leaves are pure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    /// Fraction of feature columns offered to each tree.
    pub max_features_ratio: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_estimators: 100,
            max_depth: None,
            max_features_ratio: 1.0,
        }
    }
}

/// Gradient boosting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        BoostingParams {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
        }
    }
}

/// Hyperparameters for every registered model plus trainer-wide switches.
///
/// Any field missing from a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub ridge: RidgeParams,
    pub lasso: LassoParams,
    pub random_forest: ForestParams,
    pub gradient_boosting: BoostingParams,
    /// Seed for the randomized models. `None` draws from entropy.
    pub seed: Option<u64>,
    /// Fit the models on the rayon thread pool instead of one after another.
    pub parallel: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            ridge: RidgeParams::default(),
            lasso: LassoParams::default(),
            random_forest: ForestParams::default(),
            gradient_boosting: BoostingParams::default(),
            seed: Some(42),
            parallel: false,
        }
    }
}

impl TrainerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> CineResult<Self> {
        read_json(path.as_ref())
    }
}

/// End-to-end settings for a training run from a CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target: String,
    pub categorical: Vec<String>,
    pub outlier_columns: Vec<String>,
    pub impute: String,
    pub test_ratio: f64,
    pub seed: Option<u64>,
    pub trainer: TrainerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            target: "rating".to_string(),
            categorical: Vec::new(),
            outlier_columns: Vec::new(),
            impute: "mean".to_string(),
            test_ratio: 0.2,
            seed: Some(42),
            trainer: TrainerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> CineResult<Self> {
        let config: PipelineConfig = read_json(path.as_ref())?;
        if !(0.0..1.0).contains(&config.test_ratio) {
            return Err(CineError::InvalidOperation(format!(
                "test_ratio must be in [0, 1), got {}",
                config.test_ratio
            )));
        }
        Ok(config)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CineResult<T> {
    if !path.exists() {
        return Err(CineError::NotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| CineError::Parse(format!("{}: {}", path.display(), e)))
}
