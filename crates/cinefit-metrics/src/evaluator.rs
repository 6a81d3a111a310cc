use std::collections::BTreeMap;
use std::fmt::Write;

use cinefit_core::CineResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regression::{mae, mape, median_absolute_error, mse, r2_score};

/// Quality record for one set of predictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "MSE")]
    pub mse: f64,
    #[serde(rename = "Median_AE")]
    pub median_ae: f64,
    #[serde(rename = "MAPE")]
    pub mape: f64,
}

impl MetricsRecord {
    /// Compute every metric for `(y_true, y_pred)`.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> CineResult<Self> {
        let mse = mse(y_true, y_pred)?;
        Ok(MetricsRecord {
            r2: r2_score(y_true, y_pred)?,
            rmse: mse.sqrt(),
            mae: mae(y_true, y_pred)?,
            mse,
            median_ae: median_absolute_error(y_true, y_pred)?,
            mape: mape(y_true, y_pred)?,
        })
    }

    /// Metrics in report order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("MAE", self.mae),
            ("RMSE", self.rmse),
            ("R2", self.r2),
            ("Median_AE", self.median_ae),
            ("MAPE", self.mape),
        ]
    }

    /// Plain string → number record for reporting collaborators.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map: BTreeMap<String, f64> = self
            .entries()
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        map.insert("MSE".into(), self.mse);
        map
    }
}

/// Scores predictions and remembers the most recent record for reporting.
#[derive(Debug, Default)]
pub struct MetricsCalculator {
    last: Option<MetricsRecord>,
}

impl MetricsCalculator {
    pub fn new() -> Self {
        MetricsCalculator::default()
    }

    /// Fails with `ShapeMismatch` when the sequences differ in length.
    pub fn evaluate(&mut self, y_true: &[f64], y_pred: &[f64]) -> CineResult<MetricsRecord> {
        let record = MetricsRecord::compute(y_true, y_pred)?;
        debug!(r2 = record.r2, rmse = record.rmse, mae = record.mae, "computed metrics");
        self.last = Some(record);
        Ok(record)
    }

    pub fn last(&self) -> Option<&MetricsRecord> {
        self.last.as_ref()
    }

    /// Human-readable report of the last evaluation.
    pub fn render_report(&self) -> String {
        let Some(record) = &self.last else {
            return "No metrics calculated yet. Call evaluate() first.\n".to_string();
        };
        let rule = "=".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "MODEL EVALUATION REPORT");
        let _ = writeln!(out, "{}", rule);
        for (name, value) in record.entries() {
            let _ = writeln!(out, "{:.<20} {:.4}", name, value);
        }
        let _ = writeln!(out, "{}", rule);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cinefit_core::CineError;

    #[test]
    fn test_identity_predictions() {
        let y = [6.1, 7.4, 5.0, 8.2, 6.6];
        let mut calc = MetricsCalculator::new();
        let record = calc.evaluate(&y, &y).unwrap();
        assert_abs_diff_eq!(record.mae, 0.0);
        assert_abs_diff_eq!(record.rmse, 0.0);
        assert_abs_diff_eq!(record.r2, 1.0, epsilon = 1e-12);
        assert_eq!(calc.last(), Some(&record));
    }

    #[test]
    fn test_mismatch_keeps_previous_record() {
        let mut calc = MetricsCalculator::new();
        let first = calc.evaluate(&[1.0, 2.0], &[1.0, 2.5]).unwrap();
        let err = calc.evaluate(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, CineError::ShapeMismatch { .. }));
        assert_eq!(calc.last(), Some(&first));
    }

    #[test]
    fn test_report() {
        let mut calc = MetricsCalculator::new();
        assert!(calc.render_report().starts_with("No metrics"));
        calc.evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
        let report = calc.render_report();
        assert!(report.contains("MODEL EVALUATION REPORT"));
        assert!(report.contains("MAE................. 0.3333"));
    }

    #[test]
    fn test_map_and_serde_keys() {
        let record = MetricsRecord::compute(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
        let map = record.to_map();
        assert_eq!(map.len(), 6);
        assert_abs_diff_eq!(map["MSE"], 0.5);

        let json = serde_json::to_value(record).unwrap();
        assert!(json.get("Median_AE").is_some());
        assert!(json.get("R2").is_some());
    }
}
