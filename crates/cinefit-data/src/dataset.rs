use cinefit_core::{CineError, CineResult, Matrix};
use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnKind};

/// A table of named columns with a uniform row count.
///
/// Column order is the order of the source. At most one column may be
/// designated as the target; it is never part of the feature set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
    target: Option<String>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> CineResult<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        for (idx, column) in columns.iter().enumerate() {
            if column.len() != n_rows {
                return Err(CineError::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    n_rows
                )));
            }
            if columns[..idx].iter().any(|c| c.name() == column.name()) {
                return Err(CineError::Schema(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        Ok(Dataset {
            columns,
            n_rows,
            target: None,
        })
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column, failing with a schema error when it is absent.
    pub fn require(&self, name: &str) -> CineResult<&Column> {
        self.column(name)
            .ok_or_else(|| CineError::Schema(format!("column '{}' not found", name)))
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Declared kind of a column, with the designated target reported as `Target`.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        let column = self.column(name)?;
        if self.target.as_deref() == Some(name) {
            return Some(ColumnKind::Target);
        }
        Some(column.kind())
    }

    /// Names of the feature columns (everything except the target).
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(Column::name)
            .filter(|n| self.target.as_deref() != Some(*n))
            .collect()
    }

    /// Names of the numeric columns, in column order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(Column::name)
            .collect()
    }

    /// Column names paired with their declared kinds, in column order.
    pub fn dtypes(&self) -> Vec<(&str, ColumnKind)> {
        self.columns
            .iter()
            .map(|c| (c.name(), self.kind_of(c.name()).unwrap_or_else(|| c.kind())))
            .collect()
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    // ─── Transformation ─────────────────────────────────────────────────────

    /// Mark `name` as the target column. The column must be numeric.
    pub fn designate_target(&mut self, name: &str) -> CineResult<()> {
        self.require(name)?.require_numeric()?;
        self.target = Some(name.to_string());
        Ok(())
    }

    /// Swap in a new version of an existing column (same name, same length).
    pub fn replace_column(&mut self, column: Column) -> CineResult<()> {
        if column.len() != self.n_rows {
            return Err(CineError::Schema(format!(
                "replacement column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                self.n_rows
            )));
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name() == column.name())
            .ok_or_else(|| CineError::Schema(format!("column '{}' not found", column.name())))?;
        *slot = column;
        Ok(())
    }

    /// Copy of the rows at `indices`, in that order, for every column.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
            target: self.target.clone(),
        }
    }

    /// Separate the feature columns from the target column.
    ///
    /// The returned feature set never contains `target_name`.
    pub fn split_features_target(&self, target_name: &str) -> CineResult<(Dataset, Column)> {
        let target = self.require(target_name).map_err(|_| {
            CineError::Schema(format!("Target column '{}' not found in data", target_name))
        })?;
        let features = self
            .columns
            .iter()
            .filter(|c| c.name() != target_name)
            .cloned()
            .collect();
        Ok((
            Dataset {
                columns: features,
                n_rows: self.n_rows,
                target: None,
            },
            target.clone(),
        ))
    }

    /// Dense feature matrix over the named columns, in the given order.
    ///
    /// Every named column must be numeric with no missing cells.
    pub fn to_matrix(&self, names: &[&str]) -> CineResult<Matrix> {
        if names.is_empty() {
            return Ok(Matrix::zeros(self.n_rows, 0));
        }
        let dense: Vec<Vec<f64>> = names
            .iter()
            .map(|n| self.require(n)?.to_dense())
            .collect::<CineResult<_>>()?;
        Matrix::from_columns(&dense)
    }

    /// Dense matrix of every feature column (target excluded).
    pub fn feature_matrix(&self) -> CineResult<Matrix> {
        self.to_matrix(&self.feature_names())
    }
}
