use cinefit_core::{CineResult, Matrix};
use cinefit_linear::{Lasso, LinearRegression, Ridge};
use cinefit_tree::{DecisionTreeRegressor, GradientBoostingRegressor, RandomForestRegressor};

/// Trait for supervised regressors.
pub trait Estimator {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()>;
    fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>>;
}

macro_rules! impl_estimator {
    ($($model:ty),* $(,)?) => {
        $(
            impl Estimator for $model {
                fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
                    <$model>::fit(self, x, y)
                }

                fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
                    <$model>::predict(self, x)
                }
            }
        )*
    };
}

impl_estimator!(
    LinearRegression,
    Ridge,
    Lasso,
    DecisionTreeRegressor,
    RandomForestRegressor,
    GradientBoostingRegressor,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn fit_boxed(mut model: Box<dyn Estimator>, x: &Matrix, y: &[f64]) -> Vec<f64> {
        model.fit(x, y).unwrap();
        model.predict(x).unwrap()
    }

    #[test]
    fn test_trait_objects() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = [2.0, 4.0, 6.0, 8.0];

        let ols = fit_boxed(Box::new(LinearRegression::new()), &x, &y);
        assert!((ols[3] - 8.0).abs() < 1e-9);

        let tree = fit_boxed(Box::new(DecisionTreeRegressor::new(None, 2, 1)), &x, &y);
        assert_eq!(tree, y.to_vec());
    }
}
