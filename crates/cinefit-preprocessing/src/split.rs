use cinefit_core::{CineError, CineResult, Matrix};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffled `(train, test)` row indices with `floor(n · test_ratio)` test rows.
pub fn train_test_indices(n: usize, test_ratio: f64, seed: Option<u64>) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_ratio.clamp(0.0, 1.0)).floor() as usize).min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Split data into training and test sets.
///
/// Returns `(x_train, x_test, y_train, y_test)`; row alignment between `x`
/// and `y` is preserved on both sides.
pub fn train_test_split(
    x: &Matrix,
    y: &[f64],
    test_ratio: f64,
    seed: Option<u64>,
) -> CineResult<(Matrix, Matrix, Vec<f64>, Vec<f64>)> {
    if x.rows() != y.len() {
        return Err(CineError::ShapeMismatch {
            expected: vec![x.rows()],
            got: vec![y.len()],
        });
    }
    let (train, test) = train_test_indices(x.rows(), test_ratio, seed);
    Ok((
        x.select_rows(&train),
        x.select_rows(&test),
        train.iter().map(|&i| y[i]).collect(),
        test.iter().map(|&i| y[i]).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_test_split() {
        let x = Matrix::from_rows(&[
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
            vec![7.0, 8.0],
            vec![9.0, 10.0],
        ])
        .unwrap();
        let y = vec![1.0, 3.0, 5.0, 7.0, 9.0];

        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.5, Some(42)).unwrap();

        assert_eq!(x_train.rows(), 3);
        assert_eq!(x_test.rows(), 2);
        assert_eq!(y_train.len(), 3);
        assert_eq!(y_test.len(), 2);
        // first feature equals the target in this data
        for i in 0..3 {
            assert_eq!(x_train.at(i, 0), y_train[i]);
        }
        for i in 0..2 {
            assert_eq!(x_test.at(i, 0), y_test[i]);
        }
    }

    #[test]
    fn test_indices_partition_rows() {
        let (train, test) = train_test_indices(10, 0.2, Some(7));
        assert_eq!(test.len(), 2);
        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
        assert_eq!(train_test_indices(10, 0.2, Some(7)), (train, test));
    }
}
