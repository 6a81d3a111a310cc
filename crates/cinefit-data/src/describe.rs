use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::ColumnKind;
use crate::dataset::Dataset;
use crate::stats::{mean, quantile_sorted, std_dev};

/// Summary statistics of one numeric column, over its non-missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator); `NaN` below two values.
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q = |p| quantile_sorted(&sorted, p).unwrap_or(f64::NAN);
        NumericSummary {
            count: sorted.len(),
            mean: mean(&sorted).unwrap_or(f64::NAN),
            std: std_dev(&sorted, 1).unwrap_or(f64::NAN),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: q(0.25),
            q50: q(0.5),
            q75: q(0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
}

/// Read-only description of a dataset: shape, kinds, gaps and numeric summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<ColumnInfo>,
    pub numeric_summary: BTreeMap<String, NumericSummary>,
}

impl DatasetInfo {
    /// Per-column missing counts keyed by column name.
    pub fn missing_values(&self) -> BTreeMap<&str, usize> {
        self.columns.iter().map(|c| (c.name.as_str(), c.missing)).collect()
    }
}

impl Dataset {
    pub fn describe(&self) -> DatasetInfo {
        let columns = self
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                kind: self.kind_of(c.name()).unwrap_or_else(|| c.kind()),
                missing: c.missing_count(),
            })
            .collect();
        let numeric_summary = self
            .columns()
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| (c.name().to_string(), NumericSummary::from_values(&c.present_values())))
            .collect();
        DatasetInfo {
            rows: self.n_rows(),
            cols: self.n_cols(),
            columns,
            numeric_summary,
        }
    }
}

impl fmt::Display for DatasetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shape: ({}, {})", self.rows, self.cols)?;
        for c in &self.columns {
            writeln!(f, "  {:<20} {:<12} missing={}", c.name, c.kind, c.missing)?;
        }
        for (name, s) in &self.numeric_summary {
            writeln!(
                f,
                "  {:<20} count={} mean={:.4} std={:.4} min={:.4} 50%={:.4} max={:.4}",
                name, s.count, s.mean, s.std, s.min, s.q50, s.max
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_describe() {
        let ds = Dataset::new(vec![
            Column::numeric("budget", vec![Some(1.0), Some(2.0), None, Some(4.0), Some(3.0)]),
            Column::categorical("genre", vec![Some("a".into()), None, Some("b".into()), None, None]),
        ])
        .unwrap();
        let info = ds.describe();
        assert_eq!((info.rows, info.cols), (5, 2));
        assert_eq!(info.missing_values()["budget"], 1);
        assert_eq!(info.missing_values()["genre"], 3);
        assert_eq!(info.columns[1].kind, ColumnKind::Categorical);

        let s = &info.numeric_summary["budget"];
        assert_eq!(s.count, 4);
        assert_abs_diff_eq!(s.mean, 2.5);
        assert_abs_diff_eq!(s.q25, 1.75);
        assert_abs_diff_eq!(s.max, 4.0);
        assert_abs_diff_eq!(s.std, (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(!info.numeric_summary.contains_key("genre"));
    }

    #[test]
    fn test_describe_reports_target() {
        let mut ds = Dataset::new(vec![Column::dense("rating", vec![5.0, 6.0])]).unwrap();
        ds.designate_target("rating").unwrap();
        assert_eq!(ds.describe().columns[0].kind, ColumnKind::Target);
    }
}
