use cinefit_core::{CineError, CineResult, Matrix};

/// Pivots smaller than this are treated as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// LU decomposition result: P·A = L·U
pub struct LuDecomposition {
    pub l: Matrix,
    pub u: Matrix,
    pub pivot: Vec<usize>,
}

/// LU decomposition with partial pivoting.
pub fn lu(a: &Matrix) -> CineResult<LuDecomposition> {
    let (n, m) = a.shape();
    if n != m {
        return Err(CineError::InvalidOperation(format!(
            "LU requires a square matrix, got {}x{}",
            n, m
        )));
    }

    let mut u = a.data().to_vec();
    let mut l = vec![0.0; n * n];
    let mut pivot: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = u[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = u[i * n + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_val < PIVOT_TOLERANCE {
            return Err(CineError::SingularMatrix);
        }

        if max_row != k {
            pivot.swap(k, max_row);
            for j in 0..n {
                u.swap(k * n + j, max_row * n + j);
            }
            // Only the already-computed part of L moves with the row.
            for j in 0..k {
                l.swap(k * n + j, max_row * n + j);
            }
        }

        l[k * n + k] = 1.0;

        for i in (k + 1)..n {
            let factor = u[i * n + k] / u[k * n + k];
            l[i * n + k] = factor;
            for j in k..n {
                u[i * n + j] -= factor * u[k * n + j];
            }
        }
    }

    Ok(LuDecomposition {
        l: Matrix::new(l, n, n)?,
        u: Matrix::new(u, n, n)?,
        pivot,
    })
}
