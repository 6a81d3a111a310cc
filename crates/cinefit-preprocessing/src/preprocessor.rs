use std::collections::HashMap;

use cinefit_core::{CineError, CineResult};
use cinefit_data::stats::{mean, median};
use cinefit_data::{Column, ColumnData, Dataset};
use tracing::{debug, info, warn};

use crate::encoder::LabelEncoder;
use crate::imputer::ImputeStrategy;
use crate::outliers::{filter_outliers, OutlierMethod};
use crate::scaler::StandardScaler;

/// Cleans tabular data: imputation, outlier filtering, categorical encoding
/// and feature scaling.
///
/// Every operation returns a new dataset and leaves its input untouched.
/// Label encoders are kept per column for the lifetime of the preprocessor:
/// the first `encode_categorical` call for a column fits its encoder, later
/// calls only transform.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    encoders: HashMap<String, LabelEncoder>,
    scaler: StandardScaler,
}

impl Preprocessor {
    pub fn new() -> Self {
        Preprocessor::default()
    }

    /// Start from already fitted encoders, e.g. ones restored from disk.
    /// Those columns are transform-only from the first call.
    pub fn with_encoders(encoders: impl IntoIterator<Item = LabelEncoder>) -> Self {
        Preprocessor {
            encoders: encoders.into_iter().map(|e| (e.column.clone(), e)).collect(),
            scaler: StandardScaler::default(),
        }
    }

    /// Fill missing numeric cells with the column mean or median of its
    /// present values. Categorical columns are left alone, as are columns
    /// with no present values. `Unsupported` strategies return the data unchanged.
    pub fn impute_missing(&self, dataset: &Dataset, strategy: &ImputeStrategy) -> CineResult<Dataset> {
        let before = dataset.total_missing();
        info!(missing = before, strategy = %strategy, "missing values before imputation");

        let stat: fn(&[f64]) -> Option<f64> = match strategy {
            ImputeStrategy::Mean => mean,
            ImputeStrategy::Median => median,
            ImputeStrategy::Unsupported(name) => {
                warn!(strategy = %name, "unsupported impute strategy, data left unchanged");
                return Ok(dataset.clone());
            }
        };

        let mut out = dataset.clone();
        for column in dataset.columns() {
            let Some(cells) = column.as_numeric() else {
                continue;
            };
            if column.missing_count() == 0 {
                continue;
            }
            let Some(fill) = stat(&column.present_values()) else {
                continue;
            };
            let filled = cells.iter().map(|c| Some(c.unwrap_or(fill))).collect();
            out.replace_column(Column::numeric(column.name(), filled))?;
        }

        info!(missing = out.total_missing(), "missing values after imputation");
        Ok(out)
    }

    /// Drop outlier rows, filtering on each listed column in turn.
    pub fn remove_outliers(
        &self,
        dataset: &Dataset,
        columns: &[&str],
        method: OutlierMethod,
    ) -> CineResult<Dataset> {
        let out = filter_outliers(dataset, columns, method)?;
        info!(removed = dataset.n_rows() - out.n_rows(), remaining = out.n_rows(), "outlier rows removed");
        Ok(out)
    }

    /// Replace each listed categorical column with integer codes.
    ///
    /// Fails with `UnseenCategory` when a previously fitted column contains a
    /// label that was not present at fit time.
    pub fn encode_categorical(&mut self, dataset: &Dataset, columns: &[&str]) -> CineResult<Dataset> {
        let mut out = dataset.clone();
        for &name in columns {
            let labels = categorical_labels(dataset.require(name)?)?;
            let codes = match self.encoders.get(name) {
                Some(encoder) => encoder.transform(&labels)?,
                None => {
                    let mut encoder = LabelEncoder::new(name);
                    let codes = encoder.fit_transform(&labels)?;
                    debug!(column = name, classes = encoder.n_classes(), "fitted label encoder");
                    self.encoders.insert(name.to_string(), encoder);
                    codes
                }
            };
            let encoded = codes.into_iter().map(|c| Some(c as f64)).collect();
            out.replace_column(Column::numeric(name, encoded))?;
        }
        Ok(out)
    }

    /// Map integer codes back to their labels using the fitted encoders.
    pub fn decode_categorical(&self, dataset: &Dataset, columns: &[&str]) -> CineResult<Dataset> {
        let mut out = dataset.clone();
        for &name in columns {
            let encoder = self.encoders.get(name).ok_or_else(|| {
                CineError::Schema(format!("no encoder fitted for column '{}'", name))
            })?;
            let cells = dataset.require(name)?.require_numeric()?;
            let decoded = cells
                .iter()
                .map(|c| match c {
                    None => Ok(None),
                    Some(v) if *v >= 0.0 && v.fract() == 0.0 => {
                        Ok(encoder.inverse_transform(&[*v as usize])?.pop())
                    }
                    Some(v) => Err(CineError::InvalidOperation(format!(
                        "value {} in column '{}' is not a category code",
                        v, name
                    ))),
                })
                .collect::<CineResult<Vec<_>>>()?;
            out.replace_column(Column::categorical(name, decoded))?;
        }
        Ok(out)
    }

    /// Standardize every numeric column, including integer-encoded ones.
    ///
    /// Statistics are re-fitted on each call's data.
    pub fn scale_features(&mut self, dataset: &Dataset) -> CineResult<Dataset> {
        let out = self.scaler.fit_transform(dataset)?;
        debug!(columns = self.scaler.params.len(), "scaled numeric columns");
        Ok(out)
    }

    pub fn encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn encoders(&self) -> impl Iterator<Item = &LabelEncoder> {
        self.encoders.values()
    }

    /// Statistics from the most recent `scale_features` call.
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

fn categorical_labels(column: &Column) -> CineResult<Vec<String>> {
    match column.data() {
        ColumnData::Categorical(cells) => cells
            .iter()
            .enumerate()
            .map(|(row, c)| {
                c.clone().ok_or_else(|| {
                    CineError::Schema(format!(
                        "column '{}' has a missing value at row {}",
                        column.name(),
                        row
                    ))
                })
            })
            .collect(),
        ColumnData::Numeric(_) => Err(CineError::Schema(format!(
            "column '{}' is already numeric",
            column.name()
        ))),
    }
}
