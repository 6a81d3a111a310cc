use cinefit_core::{CineError, CineResult, Matrix};
use serde::{Deserialize, Serialize};

use crate::regression::{center, linear_predict};

/// Lasso regression (L1-regularized) via cyclic coordinate descent.
///
/// Minimizes `(1 / 2n)·‖y − Xw − b‖² + α·‖w‖₁`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lasso {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub coef: Option<Vec<f64>>,
    pub intercept: f64,
    pub n_iter: usize,
}

impl Lasso {
    pub fn new(alpha: f64, max_iter: usize) -> Self {
        Lasso {
            alpha,
            max_iter,
            tol: 1e-6,
            coef: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        if self.alpha < 0.0 {
            return Err(CineError::InvalidOperation(format!(
                "lasso alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        let c = center(x, y)?;
        let (n, p) = c.x.shape();
        let n_f = n as f64;

        // Per-feature curvature (1/n)·Σ x_ij²
        let col_sq: Vec<f64> = (0..p)
            .map(|j| (0..n).map(|i| c.x.at(i, j).powi(2)).sum::<f64>() / n_f)
            .collect();

        let mut w = vec![0.0; p];
        let mut residual = c.y.clone();
        self.n_iter = 0;

        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;
            let mut max_change: f64 = 0.0;

            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                let old = w[j];
                let mut rho = 0.0;
                for i in 0..n {
                    rho += c.x.at(i, j) * (residual[i] + c.x.at(i, j) * old);
                }
                rho /= n_f;

                let new = soft_threshold(rho, self.alpha) / col_sq[j];
                if new != old {
                    let delta = new - old;
                    for (i, r) in residual.iter_mut().enumerate() {
                        *r -= c.x.at(i, j) * delta;
                    }
                    w[j] = new;
                    max_change = max_change.max(delta.abs());
                }
            }

            if max_change < self.tol {
                break;
            }
        }

        self.intercept = c.y_mean - c.x_mean.iter().zip(&w).map(|(m, wj)| m * wj).sum::<f64>();
        self.coef = Some(w);
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        let coef = self.coef.as_ref().ok_or(CineError::NotTrained)?;
        linear_predict(x, coef, self.intercept)
    }
}

fn soft_threshold(rho: f64, alpha: f64) -> f64 {
    if rho > alpha {
        rho - alpha
    } else if rho < -alpha {
        rho + alpha
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lasso_zeroes_irrelevant_feature() {
        let x = Matrix::from_rows(&[
            vec![1.0, 0.3],
            vec![2.0, -0.1],
            vec![3.0, 0.2],
            vec![4.0, -0.3],
            vec![5.0, 0.1],
        ])
        .unwrap();
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0]; // y = 2*x1

        let mut model = Lasso::new(0.05, 1000);
        model.fit(&x, &y).unwrap();

        let w = model.coef.as_ref().unwrap();
        assert!(w[1].abs() < 0.1);
        assert!((w[0] - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_lasso_zero_alpha_matches_ols() {
        let x = Matrix::from_rows(&[vec![0.0], vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let y = vec![1.0, 3.0, 5.0, 7.0];
        let mut model = Lasso::new(0.0, 10_000);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(pred[i], y[i], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_constant_column_stays_zero() {
        let x = Matrix::from_rows(&[vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]]).unwrap();
        let mut model = Lasso::new(0.1, 100);
        model.fit(&x, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(model.coef.as_ref().unwrap()[1], 0.0);
        assert!(model.predict(&x).unwrap().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_large_alpha_predicts_mean() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let mut model = Lasso::new(1e6, 100);
        model.fit(&x, &[1.0, 2.0, 6.0]).unwrap();
        for p in model.predict(&x).unwrap() {
            assert_abs_diff_eq!(p, 3.0, epsilon = 1e-12);
        }
    }
}
