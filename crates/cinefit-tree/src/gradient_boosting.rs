use cinefit_core::{CineError, CineResult, Matrix};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::decision_tree::DecisionTreeRegressor;

/// Gradient Boosted Trees for regression (squared-error loss).
///
/// Starts from the mean of `y` and sequentially fits shallow trees to the
/// residuals, each contribution shrunk by `learning_rate`. With
/// `subsample < 1.0` every stage is fitted on a random row subset drawn
/// without replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub subsample: f64,
    pub seed: Option<u64>,
    n_features: usize,
    trees: Vec<DecisionTreeRegressor>,
    initial_prediction: Option<f64>,
}

impl GradientBoostingRegressor {
    pub fn new(
        n_estimators: usize,
        learning_rate: f64,
        max_depth: usize,
        min_samples_split: usize,
        subsample: f64,
    ) -> Self {
        GradientBoostingRegressor {
            n_estimators,
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            min_samples_split: if min_samples_split == 0 { 2 } else { min_samples_split },
            subsample: subsample.clamp(0.1, 1.0),
            seed: Some(42),
            n_features: 0,
            trees: Vec::new(),
            initial_prediction: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        let n = x.rows();

        let init = y.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![init; n];
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let n_sub = ((n as f64 * self.subsample).round() as usize).clamp(1, n);

        self.trees.clear();
        for _stage in 0..self.n_estimators {
            // Negative gradient of squared error
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(yi, pi)| yi - pi).collect();

            let rows: Vec<usize> = if n_sub < n {
                let mut picked = sample(&mut rng, n, n_sub).into_vec();
                picked.sort_unstable();
                picked
            } else {
                (0..n).collect()
            };

            let mut tree = DecisionTreeRegressor::new(Some(self.max_depth), self.min_samples_split, 1);
            tree.fit_rows(x, &residuals, rows);

            for (i, p) in predictions.iter_mut().enumerate() {
                *p += self.learning_rate * tree.predict_row(x.row(i));
            }
            self.trees.push(tree);
        }

        self.initial_prediction = Some(init);
        self.n_features = x.cols();
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        let init = self.initial_prediction.ok_or(CineError::NotTrained)?;
        x.check_features(self.n_features)?;
        Ok((0..x.rows())
            .map(|i| {
                let row = x.row(i);
                init + self
                    .trees
                    .iter()
                    .map(|t| self.learning_rate * t.predict_row(row))
                    .sum::<f64>()
            })
            .collect())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
