//! Result validation utilities
//!
//! Residual measures shared by the unit and integration tests: orthogonality
//! of the accumulated factors, reconstruction through `U · diag(d) · Vᵗ`, and
//! the bidiagonal-band invariant of the reduction.

use crate::precision::Precision;
use crate::utils::norms::norm_frobenius;
use crate::Matrix;

/// Largest magnitude in `Qᵗ·Q − I` for a square matrix Q.
pub fn orthogonality_residual<T: Precision>(q: &Matrix<T>) -> T {
    let (m, n) = *q.shape();
    let mut worst = T::zero();
    for i in 0..n {
        for j in 0..n {
            let mut sum = T::zero();
            for row in 0..m {
                sum += q[[row, i]] * q[[row, j]];
            }
            let expected = if i == j { T::one() } else { T::zero() };
            worst = worst.max((sum - expected).abs());
        }
    }
    worst
}

/// Check if a matrix has orthonormal columns
pub fn is_orthogonal<T: Precision>(q: &Matrix<T>, tolerance: T) -> bool {
    orthogonality_residual(q) <= tolerance
}

/// Relative Frobenius error of `U · diag(d) · Vᵗ` against `original`.
///
/// U is m×m, Vᵗ is n×n, d has length n; only the first n columns of U enter
/// the product. A zero original yields the absolute error instead.
pub fn reconstruction_error<T: Precision>(
    original: &Matrix<T>,
    u: &Matrix<T>,
    d: &[T],
    vt: &Matrix<T>,
) -> T {
    let (m, n) = *original.shape();
    let k = d.len();

    let mut diff_sq = T::zero();
    for i in 0..m {
        for j in 0..n {
            let mut reconstructed = T::zero();
            for l in 0..k {
                reconstructed += u[[i, l]] * d[l] * vt[[l, j]];
            }
            let diff = original[[i, j]] - reconstructed;
            diff_sq += diff * diff;
        }
    }

    let diff_norm = diff_sq.sqrt();
    let orig_norm = norm_frobenius(original);
    if orig_norm == T::zero() {
        diff_norm
    } else {
        diff_norm / orig_norm
    }
}

/// Largest magnitude strictly below the diagonal or strictly above the
/// super-diagonal, i.e. outside the upper-bidiagonal band.
pub fn max_off_bidiagonal<T: Precision>(b: &Matrix<T>) -> T {
    let (m, n) = *b.shape();
    let mut worst = T::zero();
    for i in 0..m {
        for j in 0..n {
            if j == i || j == i + 1 {
                continue;
            }
            worst = worst.max(b[[i, j]].abs());
        }
    }
    worst
}
