//! # cinefit
//!
//! Tabular regression for movie ratings: load a CSV, clean it, fit a fixed
//! set of regressors and keep the one with the best R².
//!
//! ## Modules
//!
//! - **core**: error type and dense row-major `Matrix`
//! - **linalg**: LU decomposition and normal-equation solver
//! - **linear**: OLS, Ridge, Lasso
//! - **tree**: regression tree, random forest, gradient boosting
//! - **metrics**: MAE, RMSE, R², MedianAE, MAPE and the report formatter
//! - **data**: `Dataset`, CSV loading, `describe`
//! - **preprocessing**: imputation, IQR outlier filter, label encoding, scaling, train/test split
//! - **io**: model persistence and CSV writers
//! - **pipeline**: model registry, `Trainer`, `Predictor`, configuration

/// Errors and the matrix type.
pub use cinefit_core as core;

/// Linear algebra.
pub use cinefit_linalg as linalg;

/// Linear models.
pub use cinefit_linear as linear;

/// Tree-based models.
pub use cinefit_tree as tree;

/// Evaluation metrics.
pub use cinefit_metrics as metrics;

/// Tabular data model and loading.
pub use cinefit_data as data;

/// Data preprocessing.
pub use cinefit_preprocessing as preprocessing;

/// Persistence.
pub use cinefit_io as io;

/// Training and model selection.
pub use cinefit_pipeline as pipeline;

pub use cinefit_core::{CineError, CineResult, Matrix};
