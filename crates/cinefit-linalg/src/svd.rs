use cinefit_core::{CineError, CineResult, Matrix};

/// Eigenvalues below `EIGEN_RCOND · λ_max` are treated as zero.
pub const EIGEN_RCOND: f64 = 1e-12;

const MAX_SWEEPS: usize = 100;

/// Eigendecomposition of a symmetric matrix: `A = V·diag(values)·Vᵀ`.
///
/// Eigenvectors are the columns of `vectors`, in the same order as `values`.
pub struct SymmetricEigen {
    pub values: Vec<f64>,
    pub vectors: Matrix,
}

/// Cyclic Jacobi eigenvalue algorithm for symmetric matrices.
///
/// Only the symmetric part of `a` is meaningful; the input is not checked for symmetry.
pub fn symmetric_eigen(a: &Matrix) -> CineResult<SymmetricEigen> {
    let (n, m) = a.shape();
    if n != m {
        return Err(CineError::InvalidOperation(format!(
            "eigendecomposition requires a square matrix, got {}x{}",
            n, m
        )));
    }

    let mut s = a.data().to_vec();
    let mut v = Matrix::eye(n).data().to_vec();
    let total: f64 = s.iter().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += s[p * n + q] * s[p * n + q];
            }
        }
        if off <= f64::EPSILON * f64::EPSILON * total {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = s[p * n + q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (s[q * n + q] - s[p * n + p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let sn = t * c;

                // A ← Jᵀ·A·J, V ← V·J
                for k in 0..n {
                    let (akp, akq) = (s[k * n + p], s[k * n + q]);
                    s[k * n + p] = c * akp - sn * akq;
                    s[k * n + q] = sn * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (s[p * n + k], s[q * n + k]);
                    s[p * n + k] = c * apk - sn * aqk;
                    s[q * n + k] = sn * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[k * n + p], v[k * n + q]);
                    v[k * n + p] = c * vkp - sn * vkq;
                    v[k * n + q] = sn * vkp + c * vkq;
                }
            }
        }
    }

    Ok(SymmetricEigen {
        values: (0..n).map(|i| s[i * n + i]).collect(),
        vectors: Matrix::new(v, n, n)?,
    })
}

/// Minimum-norm least-squares solution of `X·w ≈ y`.
///
/// Computed as `w = pinv(X)·y` through the eigendecomposition of `XᵀX`, so
/// rank-deficient designs (constant or collinear columns, more columns than
/// rows) still get a solution. Directions with eigenvalue at or below
/// `EIGEN_RCOND · λ_max` get zero weight.
pub fn lstsq(x: &Matrix, y: &[f64]) -> CineResult<Vec<f64>> {
    let xty = x.t_matvec(y)?;
    let eig = symmetric_eigen(&x.gram())?;
    let p = x.cols();

    let lambda_max = eig.values.iter().fold(0.0_f64, |m, &l| m.max(l));
    let cutoff = lambda_max * EIGEN_RCOND;

    let mut w = vec![0.0; p];
    for (k, &lambda) in eig.values.iter().enumerate() {
        if lambda <= cutoff || lambda <= 0.0 {
            continue;
        }
        let proj: f64 = (0..p).map(|i| eig.vectors.at(i, k) * xty[i]).sum();
        let scale = proj / lambda;
        for (i, wi) in w.iter_mut().enumerate() {
            *wi += scale * eig.vectors.at(i, k);
        }
    }
    Ok(w)
}
