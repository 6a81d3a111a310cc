use cinefit_core::{CineError, CineResult, Matrix};
use serde::{Deserialize, Serialize};

/// A node in the regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    /// Internal node: rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf { value: f64 },
}

impl TreeNode {
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Decision Tree Regressor using CART (squared-error criterion).
///
/// `max_depth = None` grows the tree until leaves are pure or too small to split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    n_features: usize,
    tree: Option<TreeNode>,
}

impl DecisionTreeRegressor {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeRegressor {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            min_samples_leaf: min_samples_leaf.max(1),
            n_features: 0,
            tree: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> CineResult<()> {
        x.check_target(y)?;
        let indices: Vec<usize> = (0..x.rows()).collect();
        self.fit_rows(x, y, indices);
        Ok(())
    }

    /// Fit on a subset of rows of `x`/`y`. Inputs are assumed validated.
    pub(crate) fn fit_rows(&mut self, x: &Matrix, y: &[f64], indices: Vec<usize>) {
        self.n_features = x.cols();
        self.tree = Some(self.build(x, y, indices, 0));
    }

    fn build(&self, x: &Matrix, y: &[f64], indices: Vec<usize>, depth: usize) -> TreeNode {
        let value = mean_of(y, &indices);
        let depth_reached = self.max_depth.map_or(false, |d| depth >= d);
        if depth_reached || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value };
        }

        let node_sse: f64 = indices.iter().map(|&i| (y[i] - value).powi(2)).sum();
        if node_sse <= f64::EPSILON {
            return TreeNode::Leaf { value };
        }

        let best = match self.best_split(x, y, &indices) {
            Some(b) if b.sse < node_sse => b,
            _ => return TreeNode::Leaf { value },
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x.at(i, best.feature) <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(x, y, left, depth + 1)),
            right: Box::new(self.build(x, y, right, depth + 1)),
        }
    }

    /// Exhaustive split search with prefix sums over each sorted feature.
    fn best_split(&self, x: &Matrix, y: &[f64], indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let mut best: Option<BestSplit> = None;
        let mut order = indices.to_vec();

        for feature in 0..x.cols() {
            order.sort_by(|&a, &b| x.at(a, feature).total_cmp(&x.at(b, feature)));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let prev = order[k - 1];
                left_sum += y[prev];
                left_sq += y[prev] * y[prev];

                let lo = x.at(prev, feature);
                let hi = x.at(order[k], feature);
                if lo == hi {
                    continue;
                }
                let n_left = k;
                let n_right = n - k;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        sse,
                    });
                }
            }
        }
        best
    }

    pub fn predict(&self, x: &Matrix) -> CineResult<Vec<f64>> {
        let tree = self.tree.as_ref().ok_or(CineError::NotTrained)?;
        x.check_features(self.n_features)?;
        Ok((0..x.rows()).map(|i| tree.evaluate(x.row(i))).collect())
    }

    pub(crate) fn predict_row(&self, row: &[f64]) -> f64 {
        self.tree.as_ref().map_or(0.0, |t| t.evaluate(row))
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(TreeNode::depth)
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_decision_tree_regressor() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = vec![2.0, 4.0, 6.0, 8.0];

        let mut tree = DecisionTreeRegressor::new(None, 2, 1);
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&x).unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(pred[i], y[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_depth_limit() {
        let x = Matrix::from_rows(&[vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = vec![0.0, 1.0, 2.0, 3.0, 4.0];

        let mut stump = DecisionTreeRegressor::new(Some(1), 2, 1);
        stump.fit(&x, &y).unwrap();
        assert_eq!(stump.depth(), Some(1));
        let pred = stump.predict(&x).unwrap();
        let distinct: std::collections::BTreeSet<u64> = pred.iter().map(|v| v.to_bits()).collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn test_picks_informative_feature() {
        let x = Matrix::from_rows(&[
            vec![5.0, 0.0],
            vec![1.0, 0.0],
            vec![4.0, 1.0],
            vec![2.0, 1.0],
        ])
        .unwrap();
        let y = vec![10.0, 10.0, 20.0, 20.0];
        let mut tree = DecisionTreeRegressor::new(Some(1), 2, 1);
        tree.fit(&x, &y).unwrap();
        let probe = Matrix::from_rows(&[vec![3.0, 0.0], vec![3.0, 1.0]]).unwrap();
        assert_eq!(tree.predict(&probe).unwrap(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_constant_target_is_leaf() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let mut tree = DecisionTreeRegressor::new(None, 2, 1);
        tree.fit(&x, &[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(tree.depth(), Some(0));
    }

    #[test]
    fn test_predict_unfitted() {
        let tree = DecisionTreeRegressor::new(None, 2, 1);
        let x = Matrix::from_rows(&[vec![1.0]]).unwrap();
        assert!(matches!(tree.predict(&x), Err(CineError::NotTrained)));
    }
}
