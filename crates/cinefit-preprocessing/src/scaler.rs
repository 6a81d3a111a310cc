use cinefit_core::{CineResult, Matrix};
use cinefit_data::stats::{mean, std_dev};
use cinefit_data::{Column, Dataset};
use serde::{Deserialize, Serialize};

/// Per-column statistics learned by [`StandardScaler::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation; `1.0` when the column is constant.
    pub scale: f64,
}

/// Standardize numeric columns by removing the mean and scaling to unit variance.
///
/// Missing cells are ignored when fitting and stay missing after transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    pub params: Vec<ColumnScale>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler::default()
    }

    /// Learn mean and scale for every numeric column of `dataset`.
    pub fn fit(&mut self, dataset: &Dataset) {
        self.params = dataset
            .numeric_column_names()
            .into_iter()
            .filter_map(|name| dataset.column(name))
            .map(|c| {
                let values = c.present_values();
                let scale = match std_dev(&values, 0) {
                    Some(s) if s > f64::EPSILON => s,
                    _ => 1.0,
                };
                ColumnScale {
                    column: c.name().to_string(),
                    mean: mean(&values).unwrap_or(0.0),
                    scale,
                }
            })
            .collect();
    }

    /// Apply learned statistics to the matching columns of `dataset`.
    pub fn transform(&self, dataset: &Dataset) -> CineResult<Dataset> {
        let mut out = dataset.clone();
        for p in &self.params {
            let Some(column) = dataset.column(&p.column) else {
                continue;
            };
            let cells = column.require_numeric()?;
            let scaled = cells.iter().map(|c| c.map(|v| (v - p.mean) / p.scale)).collect();
            out.replace_column(Column::numeric(p.column.clone(), scaled))?;
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, dataset: &Dataset) -> CineResult<Dataset> {
        self.fit(dataset);
        self.transform(dataset)
    }
}

/// Rescale each matrix column to `[0, 1]`.
///
/// A small epsilon in the denominator keeps constant columns finite (they map to 0).
pub fn normalize(x: &Matrix) -> CineResult<Matrix> {
    let (rows, cols) = x.shape();
    let mut min = vec![f64::INFINITY; cols];
    let mut max = vec![f64::NEG_INFINITY; cols];
    for i in 0..rows {
        for (j, &v) in x.row(i).iter().enumerate() {
            min[j] = min[j].min(v);
            max[j] = max[j].max(v);
        }
    }
    let mut data = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for (j, &v) in x.row(i).iter().enumerate() {
            data.push((v - min[j]) / (max[j] - min[j] + 1e-8));
        }
    }
    Matrix::new(data, rows, cols)
}
