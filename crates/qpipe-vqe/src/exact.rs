//! Exact diagonalization of small Hermitian matrices.
//!
//! An n×n Hermitian matrix H = A + iB has the same spectrum as the real
//! symmetric 2n×2n matrix
//!
//! ```text
//! [ A  -B ]
//! [ B   A ]
//! ```
//!
//! with every eigenvalue appearing twice. The embedding is diagonalized
//! with cyclic Jacobi rotations, which is exact to machine precision for
//! the sizes used here.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{VqeError, VqeResult};

/// Largest tolerated |H - H†| entry.
pub const HERMITIAN_TOLERANCE: f64 = 1e-9;

/// Jacobi sweeps before giving up.
const MAX_SWEEPS: usize = 64;

/// All eigenvalues of a Hermitian matrix, in ascending order.
pub fn eigenvalues(matrix: &Array2<Complex64>) -> VqeResult<Vec<f64>> {
    let n = check_hermitian(matrix)?;
    let mut real = embed(matrix);
    let sweeps = jacobi_diagonalize(&mut real)?;

    let mut doubled: Vec<f64> = real.diag().to_vec();
    doubled.sort_by(f64::total_cmp);
    let values: Vec<f64> = doubled
        .chunks_exact(2)
        .map(|pair| 0.5 * (pair[0] + pair[1]))
        .collect();

    debug!(dim = n, sweeps, "diagonalized Hermitian matrix");
    Ok(values)
}

/// Smallest eigenvalue of a Hermitian matrix.
pub fn ground_state_energy(matrix: &Array2<Complex64>) -> VqeResult<f64> {
    let values = eigenvalues(matrix)?;
    values
        .first()
        .copied()
        .ok_or_else(|| VqeError::InvalidParameter("matrix has no eigenvalues".into()))
}

/// Validate shape and Hermiticity, returning the dimension.
fn check_hermitian(matrix: &Array2<Complex64>) -> VqeResult<usize> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || rows != cols {
        return Err(VqeError::InvalidParameter(format!(
            "expected a non-empty square matrix, got {rows}x{cols}"
        )));
    }
    if matrix.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(VqeError::NumericalIllConditioning(
            "matrix has non-finite entries".into(),
        ));
    }

    for i in 0..rows {
        for j in i..rows {
            let deviation = (matrix[[i, j]] - matrix[[j, i]].conj()).norm();
            if deviation > HERMITIAN_TOLERANCE {
                return Err(VqeError::NumericalIllConditioning(format!(
                    "matrix is not Hermitian: |H[{i},{j}] - conj(H[{j},{i}])| = {deviation:e}"
                )));
            }
        }
    }
    Ok(rows)
}

/// Real symmetric embedding [[A, -B], [B, A]] of H = A + iB.
fn embed(matrix: &Array2<Complex64>) -> Array2<f64> {
    let n = matrix.nrows();
    let mut real = Array2::<f64>::zeros((2 * n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            // Average with the mirrored entry so the embedding is exactly symmetric.
            let a = 0.5 * (matrix[[i, j]].re + matrix[[j, i]].re);
            let b = 0.5 * (matrix[[i, j]].im - matrix[[j, i]].im);
            real[[i, j]] = a;
            real[[i + n, j + n]] = a;
            real[[i, j + n]] = -b;
            real[[i + n, j]] = b;
        }
    }
    real
}

/// Cyclic Jacobi sweeps until the off-diagonal mass vanishes.
///
/// Leaves the eigenvalues on the diagonal and returns the sweep count.
fn jacobi_diagonalize(a: &mut Array2<f64>) -> VqeResult<usize> {
    let n = a.nrows();
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);
    let threshold = 1e-14 * scale;

    for sweep in 0..MAX_SWEEPS {
        if off_diagonal_norm(a) <= threshold {
            return Ok(sweep);
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
                let c = 1.0 / t.hypot(1.0);
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
            }
        }
    }

    if off_diagonal_norm(a) <= threshold {
        Ok(MAX_SWEEPS)
    } else {
        Err(VqeError::NumericalIllConditioning(format!(
            "Jacobi iteration did not converge in {MAX_SWEEPS} sweeps"
        )))
    }
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for p in 0..n {
        for q in (p + 1)..n {
            sum += a[[p, q]] * a[[p, q]];
        }
    }
    sum.sqrt()
}
