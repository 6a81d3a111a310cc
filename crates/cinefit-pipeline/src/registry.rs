use std::fmt;
use std::str::FromStr;

use cinefit_core::{CineError, CineResult, Matrix};
use cinefit_linear::{Lasso, LinearRegression, Ridge};
use cinefit_tree::{GradientBoostingRegressor, RandomForestRegressor};
use serde::{Deserialize, Serialize};

use crate::config::TrainerConfig;
use crate::estimator::Estimator;

/// The fixed set of model variants, in registration order.
///
/// Registration order is the selection tie-break: when two models score the
/// same R², the one listed first stays selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "ridge")]
    Ridge,
    #[serde(rename = "lasso")]
    Lasso,
    #[serde(rename = "rf")]
    RandomForest,
    #[serde(rename = "gb")]
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Linear,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Short registry name used in reports and saved artifacts.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Ridge => "ridge",
            ModelKind::Lasso => "lasso",
            ModelKind::RandomForest => "rf",
            ModelKind::GradientBoosting => "gb",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = CineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelKind::Linear),
            "ridge" => Ok(ModelKind::Ridge),
            "lasso" => Ok(ModelKind::Lasso),
            "rf" | "random_forest" => Ok(ModelKind::RandomForest),
            "gb" | "gradient_boosting" => Ok(ModelKind::GradientBoosting),
            other => Err(CineError::InvalidOperation(format!("unknown model '{}'", other))),
        }
    }
}

/// A concrete regressor from the registry, fitted or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum Regressor {
    Linear(LinearRegression),
    Ridge(Ridge),
    Lasso(Lasso),
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
}

impl Regressor {
    /// Unfitted regressor for `kind`, configured from `config`.
    pub fn build(kind: ModelKind, config: &TrainerConfig) -> Self {
        match kind {
            ModelKind::Linear => Regressor::Linear(LinearRegression::new()),
            ModelKind::Ridge => Regressor::Ridge(Ridge::new(config.ridge.alpha)),
            ModelKind::Lasso => {
                Regressor::Lasso(Lasso::new(config.lasso.alpha, config.lasso.max_iter))
            }
            ModelKind::RandomForest => {
                let p = &config.random_forest;
                Regressor::RandomForest(
                    RandomForestRegressor::new(p.n_estimators, p.max_depth, p.max_features_ratio)
                        .with_seed(config.seed),
                )
            }
            ModelKind::GradientBoosting => {
                let p = &config.gradient_boosting;
                Regressor::GradientBoosting(
                    GradientBoostingRegressor::new(
                        p.n_estimators,
                        p.learning_rate,
                        p.max_depth,
                        2,
                        p.subsample,
                    )
                    .with_seed(config.seed),
                )
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::Linear(_) => ModelKind::Linear,
            Regressor::Ridge(_) => ModelKind::Ridge,
            Regressor::Lasso(_) => ModelKind::Lasso,
            Regressor::RandomForest(_) => ModelKind::RandomForest,
            Regressor::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }

    fn as_estimator(&self) -> &dyn Estimator {
        match self {
            Regressor::Linear(m) => m,
            Regressor::Ridge(m) => m,
            Regressor::Lasso(m) => m,
            Regressor::RandomForest(m) => m,
            Regressor::GradientBoosting(m) => m,
        }
    }

    fn as_estimator_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Regressor::Linear(m) => m,
            Regressor::Ridge(m) => m,
            Regressor::Lasso(m) => m,
            Regressor::RandomForest(m) => m,
            Regressor::GradientBoosting(m) => m,
        }
    }
}

impl Estimator for Regressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        self.as_estimator_mut().fit(x, y)
    }

    fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        self.as_estimator().predict(x)
    }
}

/// A fitted regressor tagged with its registry name. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    name: ModelKind,
    /// Number of feature columns seen at fit time.
    n_features: usize,
    regressor: Regressor,
}

impl TrainedModel {
    /// Fit `regressor` on `(x, y)` and seal the result.
    pub fn fit(mut regressor: Regressor, x: &Matrix, y: &[f64]) -> CineResult<Self> {
        regressor.fit(x, y)?;
        Ok(TrainedModel {
            name: regressor.kind(),
            n_features: x.cols(),
            regressor,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.name
    }

    pub fn name(&self) -> &'static str {
        self.name.name()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        x.check_features(self.n_features)?;
        self.regressor.predict(x)
    }
}
