use cinefit_core::{CineError, CineResult, Matrix};

use crate::decomposition::{lu, PIVOT_TOLERANCE};
use crate::svd::lstsq;

/// Solve the linear system `A·x = b` using LU decomposition.
pub fn solve(a: &Matrix, b: &[f64]) -> CineResult<Vec<f64>> {
    let n = a.rows();
    if b.len() != n {
        return Err(CineError::ShapeMismatch {
            expected: vec![n],
            got: vec![b.len()],
        });
    }

    let decomp = lu(a)?;

    // Forward substitution: L·y = P·b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += decomp.l.at(i, j) * y[j];
        }
        y[i] = b[decomp.pivot[i]] - sum;
    }

    // Back substitution: U·x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += decomp.u.at(i, j) * x[j];
        }
        let diag = decomp.u.at(i, i);
        if diag.abs() < PIVOT_TOLERANCE {
            return Err(CineError::SingularMatrix);
        }
        x[i] = (y[i] - sum) / diag;
    }

    Ok(x)
}

/// Solve the regularized normal equations `(XᵀX + αI)·w = Xᵀy`.
///
/// With `alpha == 0` this is ordinary least squares and `XᵀX` may be
/// singular, so the minimum-norm solution from [`lstsq`] is returned instead
/// of an LU solve. A positive `alpha` keeps the system positive definite.
pub fn solve_normal_equations(x: &Matrix, y: &[f64], alpha: f64) -> CineResult<Vec<f64>> {
    if alpha == 0.0 {
        return lstsq(x, y);
    }
    let mut xtx = x.gram();
    for i in 0..xtx.cols() {
        let v = xtx.at(i, i);
        xtx.set(i, i, v + alpha)?;
    }
    let xty = x.t_matvec(y)?;
    solve(&xtx, &xty)
}
