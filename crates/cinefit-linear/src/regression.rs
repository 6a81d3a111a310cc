use cinefit_core::{CineError, CineResult, Matrix};
use cinefit_linalg::solve_normal_equations;
use serde::{Deserialize, Serialize};

/// Column-centered copy of `(x, y)` plus the means that were removed.
///
/// Fitting on centered data keeps the intercept out of any penalty term.
pub(crate) struct Centered {
    pub x: Matrix,
    pub y: Vec<f64>,
    pub x_mean: Vec<f64>,
    pub y_mean: f64,
}

pub(crate) fn center(x: &Matrix, y: &[f64]) -> CineResult<Centered> {
    let (n, p) = x.shape();
    let x_mean = x.column_means();
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut data = Vec::with_capacity(n * p);
    for i in 0..n {
        data.extend(x.row(i).iter().zip(&x_mean).map(|(v, m)| v - m));
    }
    Ok(Centered {
        x: Matrix::new(data, n, p)?,
        y: y.iter().map(|v| v - y_mean).collect(),
        x_mean,
        y_mean,
    })
}

pub(crate) fn linear_predict(x: &Matrix, coef: &[f64], intercept: f64) -> CineResult<Vec<f64>> {
    x.check_features(coef.len())?;
    Ok(x.matvec(coef)?.into_iter().map(|v| v + intercept).collect())
}

fn intercept_for(c: &Centered, coef: &[f64]) -> f64 {
    c.y_mean - c.x_mean.iter().zip(coef).map(|(m, w)| m * w).sum::<f64>()
}

/// Ordinary Least Squares linear regression.
///
/// Fits `y = Xw + b` on centered data with the minimum-norm least-squares
/// solution `w = pinv(Xc)·yc`, which equals `(XcᵀXc)⁻¹Xcᵀyc` when `Xc` has
/// full column rank. Constant or collinear features do not make the fit fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coef: Option<Vec<f64>>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        LinearRegression::default()
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        let c = center(x, y)?;
        let coef = solve_normal_equations(&c.x, &c.y, 0.0)?;
        self.intercept = intercept_for(&c, &coef);
        self.coef = Some(coef);
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        let coef = self.coef.as_ref().ok_or(CineError::NotTrained)?;
        linear_predict(x, coef, self.intercept)
    }
}

/// Ridge regression (L2-regularized).
///
/// Fits using `w = (XcᵀXc + αI)⁻¹Xcᵀyc`; the intercept is not penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ridge {
    pub alpha: f64,
    pub coef: Option<Vec<f64>>,
    pub intercept: f64,
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Ridge {
            alpha,
            coef: None,
            intercept: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        if self.alpha < 0.0 {
            return Err(CineError::InvalidOperation(format!(
                "ridge alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        let c = center(x, y)?;
        let coef = solve_normal_equations(&c.x, &c.y, self.alpha)?;
        self.intercept = intercept_for(&c, &coef);
        self.coef = Some(coef);
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        let coef = self.coef.as_ref().ok_or(CineError::NotTrained)?;
        linear_predict(x, coef, self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane() -> (Matrix, Vec<f64>) {
        // y = 2*x1 + 3*x2 + 1
        let x = Matrix::from_rows(&[
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![3.0, 4.0],
            vec![4.0, 3.0],
            vec![5.0, 5.0],
        ])
        .unwrap();
        let y = (0..5).map(|i| 2.0 * x.at(i, 0) + 3.0 * x.at(i, 1) + 1.0).collect();
        (x, y)
    }

    #[test]
    fn test_linear_regression() {
        let (x, y) = plane();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coef.as_ref().unwrap();
        assert_abs_diff_eq!(coef[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(coef[1], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.intercept, 1.0, epsilon = 1e-8);

        let pred = model.predict(&x).unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(pred[i], y[i], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_ridge_shrinks_towards_ols() {
        let (x, y) = plane();
        let mut small = Ridge::new(0.01);
        small.fit(&x, &y).unwrap();
        let pred = small.predict(&x).unwrap();
        for i in 0..5 {
            assert!((pred[i] - y[i]).abs() < 0.5);
        }

        let mut large = Ridge::new(100.0);
        large.fit(&x, &y).unwrap();
        let norm = |c: &[f64]| c.iter().map(|v| v * v).sum::<f64>();
        assert!(norm(large.coef.as_ref().unwrap()) < norm(small.coef.as_ref().unwrap()));
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = plane();
        assert!(matches!(LinearRegression::new().predict(&x), Err(CineError::NotTrained)));
        assert!(matches!(Ridge::new(1.0).predict(&x), Err(CineError::NotTrained)));
    }

    #[test]
    fn test_feature_count_checked() {
        let (x, y) = plane();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let narrow = Matrix::from_rows(&[vec![1.0]]).unwrap();
        assert!(matches!(model.predict(&narrow), Err(CineError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_constant_feature() {
        // Second column is constant and carries no information.
        let x = Matrix::from_rows(&(0..10).map(|i| vec![i as f64, 2000.0]).collect::<Vec<_>>()).unwrap();
        let y: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 1.0).collect();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coef.as_ref().unwrap();
        assert_abs_diff_eq!(coef[0], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(coef[1], 0.0, epsilon = 1e-8);
        for (p, t) in model.predict(&x).unwrap().iter().zip(&y) {
            assert_abs_diff_eq!(p, t, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_duplicated_feature() {
        let x = Matrix::from_rows(&(0..8).map(|i| vec![i as f64, i as f64]).collect::<Vec<_>>()).unwrap();
        let y: Vec<f64> = (0..8).map(|i| 4.0 * i as f64 - 2.0).collect();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let coef = model.coef.as_ref().unwrap();
        assert_abs_diff_eq!(coef[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(coef[1], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.intercept, -2.0, epsilon = 1e-8);

        let mut ridge = Ridge::new(0.0);
        ridge.fit(&x, &y).unwrap();
        assert_eq!(ridge.coef, model.coef);
    }

    #[test]
    fn test_more_features_than_samples() {
        let x = Matrix::from_rows(&[
            vec![1.0, 0.0, 3.0, 1.0],
            vec![0.0, 2.0, 1.0, 0.0],
            vec![4.0, 1.0, 0.0, 2.0],
        ])
        .unwrap();
        let y = vec![1.0, 2.0, 5.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        for (p, t) in model.predict(&x).unwrap().iter().zip(&y) {
            assert_abs_diff_eq!(p, t, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let (mut x, y) = plane();
        x.set(2, 1, f64::INFINITY).unwrap();
        assert!(matches!(LinearRegression::new().fit(&x, &y), Err(CineError::InvalidOperation(_))));

        let (x, mut y) = plane();
        y[0] = f64::NEG_INFINITY;
        assert!(matches!(Ridge::new(1.0).fit(&x, &y), Err(CineError::InvalidOperation(_))));
    }
}
