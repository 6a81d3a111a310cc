use crate::error::{CineError, CineResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D matrix of `f64` values. Rows are samples, columns are features.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> CineResult<Self> {
        if data.len() != rows * cols {
            return Err(CineError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Identity matrix of size n×n.
    pub fn eye(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from a slice of rows. All rows must have equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> CineResult<Self> {
        if rows.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let cols = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(CineError::ShapeMismatch {
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(data, rows.len(), cols)
    }

    /// Build from column vectors of equal length.
    pub fn from_columns(columns: &[Vec<f64>]) -> CineResult<Self> {
        if columns.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(CineError::ShapeMismatch {
                expected: vec![rows],
                got: vec![bad.len()],
            });
        }
        let cols = columns.len();
        let mut data = vec![0.0; rows * cols];
        for (j, column) in columns.iter().enumerate() {
            for (i, &v) in column.iter().enumerate() {
                data[i * cols + j] = v;
            }
        }
        Ok(Matrix { data, rows, cols })
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unchecked element access; callers iterate within `shape()`.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    pub fn get(&self, i: usize, j: usize) -> CineResult<f64> {
        if i >= self.rows || j >= self.cols {
            return Err(CineError::InvalidOperation(format!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                i, j, self.rows, self.cols
            )));
        }
        Ok(self.at(i, j))
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> CineResult<()> {
        if i >= self.rows || j >= self.cols {
            return Err(CineError::InvalidOperation(format!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                i, j, self.rows, self.cols
            )));
        }
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    /// Borrow one row as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copy one column out.
    pub fn col(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.at(i, j)).collect()
    }

    // ─── Shape Manipulation ─────────────────────────────────────────────────

    /// Gather rows by index, preserving the given order. Indices may repeat.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }

    /// Gather columns by index, preserving the given order.
    pub fn select_cols(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(self.rows * indices.len());
        for i in 0..self.rows {
            for &j in indices {
                data.push(self.at(i, j));
            }
        }
        Matrix {
            data,
            rows: self.rows,
            cols: indices.len(),
        }
    }

    // ─── Linear Algebra ─────────────────────────────────────────────────────

    /// Matrix-vector product `self · v`.
    pub fn matvec(&self, v: &[f64]) -> CineResult<Vec<f64>> {
        if v.len() != self.cols {
            return Err(CineError::ShapeMismatch {
                expected: vec![self.cols],
                got: vec![v.len()],
            });
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// `selfᵀ · v` without materializing the transpose.
    pub fn t_matvec(&self, v: &[f64]) -> CineResult<Vec<f64>> {
        if v.len() != self.rows {
            return Err(CineError::ShapeMismatch {
                expected: vec![self.rows],
                got: vec![v.len()],
            });
        }
        let mut out = vec![0.0; self.cols];
        for (i, &vi) in v.iter().enumerate() {
            for (o, &a) in out.iter_mut().zip(self.row(i)) {
                *o += a * vi;
            }
        }
        Ok(out)
    }

    /// Gram matrix `selfᵀ · self`.
    pub fn gram(&self) -> Matrix {
        let p = self.cols;
        let mut out = Matrix::zeros(p, p);
        for i in 0..self.rows {
            let r = self.row(i);
            for a in 0..p {
                for b in a..p {
                    out.data[a * p + b] += r[a] * r[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                out.data[a * p + b] = out.data[b * p + a];
            }
        }
        out
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    pub fn column_means(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for i in 0..self.rows {
            for (s, &v) in sums.iter_mut().zip(self.row(i)) {
                *s += v;
            }
        }
        let n = self.rows.max(1) as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }

    /// Check that `y` is row-aligned with this matrix and both are usable for fitting.
    pub fn check_target(&self, y: &[f64]) -> CineResult<()> {
        if self.rows != y.len() {
            return Err(CineError::ShapeMismatch {
                expected: vec![self.rows],
                got: vec![y.len()],
            });
        }
        if self.rows == 0 {
            return Err(CineError::InvalidOperation("cannot fit on zero samples".into()));
        }
        if self.has_non_finite() || y.iter().any(|v| !v.is_finite()) {
            return Err(CineError::InvalidOperation(
                "input contains missing or infinite values".into(),
            ));
        }
        Ok(())
    }

    /// Check that this matrix has the feature count a fitted model expects.
    pub fn check_features(&self, expected: usize) -> CineResult<()> {
        if self.cols != expected {
            return Err(CineError::ShapeMismatch {
                expected: vec![self.rows, expected],
                got: vec![self.rows, self.cols],
            });
        }
        Ok(())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix({}x{})", self.rows, self.cols)?;
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|v| format!("{:.4}", v)).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        Ok(())
    }
}
