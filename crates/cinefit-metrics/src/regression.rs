use cinefit_core::{CineError, CineResult};

fn check_pair(y_true: &[f64], y_pred: &[f64]) -> CineResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(CineError::ShapeMismatch {
            expected: vec![y_true.len()],
            got: vec![y_pred.len()],
        });
    }
    if y_true.is_empty() {
        return Err(CineError::InvalidOperation(
            "metrics need at least one sample".into(),
        ));
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Mean Squared Error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    Ok(mean(
        y_true.iter().zip(y_pred).map(|(t, p)| (t - p) * (t - p)),
        y_true.len(),
    ))
}

/// Root Mean Squared Error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Mean Absolute Error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    Ok(mean(
        y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()),
        y_true.len(),
    ))
}

/// R² (coefficient of determination).
///
/// For a constant `y_true` the ratio is undefined: returns `1.0` when the
/// predictions are exact and `NaN` otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    let mean_true = mean(y_true.iter().copied(), y_true.len());

    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p) * (t - p)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true) * (t - mean_true)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { f64::NAN });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Median of absolute errors.
pub fn median_absolute_error(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    let mut errors: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).collect();
    errors.sort_by(f64::total_cmp);
    let n = errors.len();
    Ok(if n % 2 == 1 {
        errors[n / 2]
    } else {
        (errors[n / 2 - 1] + errors[n / 2]) / 2.0
    })
}

/// Mean Absolute Percentage Error, as a fraction (0.05 = 5%).
///
/// Each term is `|y − ŷ| / max(|y|, ε)`, so zero targets give a large but
/// finite contribution rather than a division by zero.
pub fn mape(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    Ok(mean(
        y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p).abs() / t.abs().max(f64::EPSILON)),
        y_true.len(),
    ))
}

/// Explained Variance Score.
///
/// EV = 1 - Var(y - ŷ) / Var(y)
pub fn explained_variance(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    let n = y_true.len();
    let residuals: Vec<f64> = y_true.iter().zip(y_pred).map(|(t, p)| t - p).collect();
    let res_mean = mean(residuals.iter().copied(), n);
    let var_res = mean(residuals.iter().map(|r| (r - res_mean) * (r - res_mean)), n);

    let y_mean = mean(y_true.iter().copied(), n);
    let var_y = mean(y_true.iter().map(|t| (t - y_mean) * (t - y_mean)), n);

    if var_y == 0.0 {
        return Ok(if var_res == 0.0 { 1.0 } else { f64::NAN });
    }
    Ok(1.0 - var_res / var_y)
}

/// Maximum absolute error.
pub fn max_error(y_true: &[f64], y_pred: &[f64]) -> CineResult<f64> {
    check_pair(y_true, y_pred)?;
    Ok(y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .fold(0.0_f64, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse() {
        let y = [1.0, 2.0, 3.0];
        assert_abs_diff_eq!(mse(&y, &y).unwrap(), 0.0);
        assert_abs_diff_eq!(mse(&y, &[2.0, 2.0, 5.0]).unwrap(), 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rmse(&[0.0, 0.0], &[3.0, 3.0]).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_perfect() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(r2_score(&y, &y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_mean_predictor_is_zero() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(r2_score(&y, &[2.5; 4]).unwrap(), 0.0, epsilon = 1e-12);
        assert!(r2_score(&y, &[10.0; 4]).unwrap() < 0.0);
    }

    #[test]
    fn test_r2_constant_target() {
        let y = [3.0, 3.0, 3.0];
        assert_eq!(r2_score(&y, &y).unwrap(), 1.0);
        assert!(r2_score(&y, &[3.0, 3.0, 4.0]).unwrap().is_nan());
    }

    #[test]
    fn test_mae() {
        assert_abs_diff_eq!(
            mae(&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]).unwrap(),
            0.5,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_median_ae() {
        assert_abs_diff_eq!(
            median_absolute_error(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap(),
            0.5
        );
        assert_abs_diff_eq!(
            median_absolute_error(&[1.0, 2.0, 3.0], &[1.0, 4.0, 6.0]).unwrap(),
            2.0
        );
    }

    #[test]
    fn test_mape_guards_zero() {
        assert_abs_diff_eq!(mape(&[2.0, 4.0], &[1.0, 5.0]).unwrap(), 0.375, epsilon = 1e-12);
        let guarded = mape(&[0.0, 1.0], &[1.0, 1.0]).unwrap();
        assert!(guarded.is_finite());
        assert!(guarded > 1e10);
    }

    #[test]
    fn test_length_mismatch() {
        let err = mae(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, CineError::ShapeMismatch { .. }));
        assert!(mse(&[], &[]).is_err());
    }

    #[test]
    fn test_explained_variance_ignores_bias() {
        let y = [1.0, 2.0, 3.0];
        let shifted = [2.0, 3.0, 4.0];
        assert_abs_diff_eq!(explained_variance(&y, &shifted).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(max_error(&y, &shifted).unwrap(), 1.0);
    }
}
