use cinefit_core::CineResult;
use cinefit_data::stats::quantile_sorted;
use cinefit_data::Dataset;
use serde::{Deserialize, Serialize};

/// Outlier detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Keep values inside `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]`.
    #[default]
    Iqr,
}

impl OutlierMethod {
    /// Inclusive bounds for `values`, or `None` when there is nothing to measure.
    pub fn bounds(&self, values: &[f64]) -> Option<(f64, f64)> {
        match self {
            OutlierMethod::Iqr => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let q1 = quantile_sorted(&sorted, 0.25)?;
                let q3 = quantile_sorted(&sorted, 0.75)?;
                let iqr = q3 - q1;
                Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
            }
        }
    }
}

/// Filter rows column by column, in the order given.
///
/// Each column's bounds are computed on the rows that survived the previous
/// columns, so the result depends on column order. Rows with a missing value
/// in a listed column are dropped.
pub fn filter_outliers(
    dataset: &Dataset,
    columns: &[&str],
    method: OutlierMethod,
) -> CineResult<Dataset> {
    let mut current = dataset.clone();
    for &name in columns {
        let cells = current.require(name)?.require_numeric()?;
        let present: Vec<f64> = cells.iter().flatten().copied().collect();
        let keep: Vec<usize> = match method.bounds(&present) {
            Some((lower, upper)) => cells
                .iter()
                .enumerate()
                .filter(|(_, c)| matches!(c, Some(v) if *v >= lower && *v <= upper))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };
        if keep.len() != current.n_rows() {
            current = current.take_rows(&keep);
        }
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinefit_core::CineError;
    use cinefit_data::Column;

    #[test]
    fn test_iqr_bounds() {
        let (lo, hi) = OutlierMethod::Iqr.bounds(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!((lo, hi), (1.75 - 2.25, 3.25 + 2.25));
        assert_eq!(OutlierMethod::Iqr.bounds(&[]), None);
    }

    #[test]
    fn test_filter_single_column() {
        let ds = Dataset::new(vec![
            Column::dense("budget", vec![10.0, 11.0, 12.0, 13.0, 500.0]),
            Column::dense("rating", vec![5.0, 6.0, 7.0, 8.0, 9.0]),
        ])
        .unwrap();
        let out = filter_outliers(&ds, &["budget"], OutlierMethod::Iqr).unwrap();
        assert_eq!(out.n_rows(), 4);
        assert_eq!(out.require("rating").unwrap().to_dense().unwrap(), vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_sequential_filtering_is_order_dependent() {
        // Filtering on `a` first removes row 4, which tightens `b`'s bounds
        // enough to also drop row 3. A combined mask would keep row 3.
        let ds = Dataset::new(vec![
            Column::dense("a", vec![1.0, 2.0, 3.0, 4.0, 100.0]),
            Column::dense("b", vec![0.0, 0.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap();
        let a_then_b = filter_outliers(&ds, &["a", "b"], OutlierMethod::Iqr).unwrap();
        assert_eq!(a_then_b.n_rows(), 3);

        let b_then_a = filter_outliers(&ds, &["b", "a"], OutlierMethod::Iqr).unwrap();
        assert_eq!(b_then_a.n_rows(), 4);
    }

    #[test]
    fn test_never_grows_and_tolerates_clean_data() {
        let ds = Dataset::new(vec![Column::dense("x", vec![1.0, 2.0, 3.0])]).unwrap();
        let out = filter_outliers(&ds, &["x"], OutlierMethod::Iqr).unwrap();
        assert_eq!(out, ds);
        let again = filter_outliers(&out, &["x"], OutlierMethod::Iqr).unwrap();
        assert!(again.n_rows() <= out.n_rows());
    }

    #[test]
    fn test_missing_cells_and_bad_columns() {
        let ds = Dataset::new(vec![
            Column::numeric("x", vec![Some(1.0), None, Some(2.0)]),
            Column::categorical("g", vec![Some("a".into()), Some("b".into()), None]),
        ])
        .unwrap();
        assert_eq!(filter_outliers(&ds, &["x"], OutlierMethod::Iqr).unwrap().n_rows(), 2);
        assert!(matches!(
            filter_outliers(&ds, &["g"], OutlierMethod::Iqr),
            Err(CineError::Schema(_))
        ));
        assert!(matches!(
            filter_outliers(&ds, &["nope"], OutlierMethod::Iqr),
            Err(CineError::Schema(_))
        ));
    }
}
