use cinefit_core::{CineError, CineResult, Matrix};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decision_tree::DecisionTreeRegressor;

/// One bagged member of the forest and the feature columns it was grown on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestMember {
    features: Vec<usize>,
    tree: DecisionTreeRegressor,
}

/// Random Forest Regressor: bootstrap-aggregated regression trees.
///
/// Each tree sees a bootstrap sample of the rows and a random subset of
/// `ceil(p · max_features_ratio)` columns. Per-tree seeds are drawn up front
/// from `seed`, so the fitted forest does not depend on thread scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features_ratio: f64,
    pub seed: Option<u64>,
    n_features: usize,
    members: Vec<ForestMember>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, max_features_ratio: f64) -> Self {
        RandomForestRegressor {
            n_estimators: n_estimators.max(1),
            max_depth,
            min_samples_split: 2,
            max_features_ratio: max_features_ratio.clamp(f64::EPSILON, 1.0),
            seed: Some(42),
            n_features: 0,
            members: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        let (n, p) = x.shape();
        let max_features = ((p as f64 * self.max_features_ratio).ceil() as usize).clamp(1, p.max(1));

        let mut base_rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| base_rng.gen()).collect();

        let max_depth = self.max_depth;
        let min_samples_split = self.min_samples_split;
        self.members = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

                let mut features: Vec<usize> = (0..p).collect();
                features.shuffle(&mut rng);
                features.truncate(max_features);
                features.sort_unstable();

                let x_sub = x.select_cols(&features);
                let mut tree = DecisionTreeRegressor::new(max_depth, min_samples_split, 1);
                tree.fit_rows(&x_sub, y, sample);
                ForestMember { features, tree }
            })
            .collect();
        self.n_features = p;
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        if self.members.is_empty() {
            return Err(CineError::NotTrained);
        }
        x.check_features(self.n_features)?;

        let n_trees = self.members.len() as f64;
        let mut row_buf = Vec::new();
        let mut predictions = Vec::with_capacity(x.rows());
        for i in 0..x.rows() {
            let row = x.row(i);
            let mut sum = 0.0;
            for member in &self.members {
                row_buf.clear();
                row_buf.extend(member.features.iter().map(|&f| row[f]));
                sum += member.tree.predict_row(&row_buf);
            }
            predictions.push(sum / n_trees);
        }
        Ok(predictions)
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }
}
