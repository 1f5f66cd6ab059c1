//! Householder bidiagonalization and reflector expansion
//!
//! Reduces a tall matrix to upper-bidiagonal form by alternating left and
//! right Householder reflectors, keeping the reflectors in compact stores
//! (scale on the diagonal, vector tail below, leading 1 implicit). The
//! stores expand back into explicit orthogonal factors by composing the
//! reflectors against an identity seed in reverse construction order.

use mdarray::Tensor;

use crate::kernel::LinalgKernel;
use crate::precision::Precision;
use crate::svd::SVDError;
use crate::Matrix;

/// Compact bidiagonal factorization of a tall matrix.
///
/// Conceptually `Qᵗ · A · R = B` with B upper bidiagonal; `q` and `r` hold
/// the reflector sequences in compact form, `b` is the reduced matrix whose
/// leading band carries the bidiagonal values (entries off the band are
/// rounding residue and never read back).
#[derive(Debug, Clone)]
pub struct Bidiagonal<T> {
    /// Compact left reflector store, m×n; reflector j at column j.
    pub q: Matrix<T>,
    /// The reduced matrix, m×n.
    pub b: Matrix<T>,
    /// Compact right reflector store, n×n; reflector j at column j+1.
    pub r: Matrix<T>,
}

impl<T: Precision> Bidiagonal<T> {
    /// Main diagonal of the reduced matrix, length n.
    pub fn diagonal(&self) -> Vec<T> {
        let (_, n) = *self.b.shape();
        (0..n).map(|i| self.b[[i, i]]).collect()
    }

    /// Super-diagonal of the reduced matrix, length n−1.
    pub fn superdiagonal(&self) -> Vec<T> {
        let (_, n) = *self.b.shape();
        (0..n.saturating_sub(1)).map(|i| self.b[[i, i + 1]]).collect()
    }
}

/// Reflect the panel `a[j.., j..]` so column j is zero below the diagonal.
///
/// The rank-one update `panel -= v ⊗ (β · panelᵗ v)` runs over every column
/// of the panel; β lands at `store[j, j]`, the v-tail below it.
pub fn reflect_column<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    a: &mut Matrix<T>,
    store: &mut Matrix<T>,
    j: usize,
) {
    let (m, n) = *a.shape();
    let x: Vec<T> = (j..m).map(|i| a[[i, j]]).collect();
    let (beta, v) = kernel.householder(&x);

    for col in j..n {
        let mut w = T::zero();
        for i in j..m {
            w += v[i - j] * a[[i, col]];
        }
        w = beta * w;
        for i in j..m {
            a[[i, col]] -= v[i - j] * w;
        }
    }

    store[[j, j]] = beta;
    for i in j + 1..m {
        store[[i, j]] = v[i - j];
    }
}

/// Reflect the panel `a[j.., j+1..]` from the right so row j is zero past
/// the super-diagonal.
///
/// Acts on the transpose of the panel, so the reflector comes from row j and
/// the update runs row by row; β lands at `store[j+1, j+1]`, the v-tail
/// below it.
pub fn reflect_row<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    a: &mut Matrix<T>,
    store: &mut Matrix<T>,
    j: usize,
) {
    let (m, n) = *a.shape();
    let x: Vec<T> = (j + 1..n).map(|col| a[[j, col]]).collect();
    let (beta, v) = kernel.householder(&x);

    for row in j..m {
        let mut w = T::zero();
        for col in j + 1..n {
            w += a[[row, col]] * v[col - j - 1];
        }
        w = beta * w;
        for col in j + 1..n {
            a[[row, col]] -= w * v[col - j - 1];
        }
    }

    store[[j + 1, j + 1]] = beta;
    for col in j + 2..n {
        store[[col, j + 1]] = v[col - j - 1];
    }
}

/// Reduce a tall matrix to upper-bidiagonal form.
///
/// Requires m ≥ n. Columns 0..n−2 get a left and a right reflector each; the
/// tail columns get left reflectors only, one fewer when the matrix is
/// square (a 1×1 trailing panel has nothing left to reflect).
pub fn householder_bidiag<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    a: &Matrix<T>,
) -> Result<Bidiagonal<T>, SVDError> {
    let (m, n) = *a.shape();
    if m == 0 || n == 0 {
        return Err(SVDError::EmptyMatrix);
    }
    if m < n {
        return Err(SVDError::NotTall { rows: m, cols: n });
    }

    let mut b = a.clone();
    let mut q = Tensor::from_elem((m, n), T::zero());
    let mut r = Tensor::from_elem((n, n), T::zero());

    let rq = if m == n { n - 1 } else { n };
    for j in 0..n.saturating_sub(2) {
        reflect_column(kernel, &mut b, &mut q, j);
        reflect_row(kernel, &mut b, &mut r, j);
    }
    for j in n.saturating_sub(2)..rq {
        reflect_column(kernel, &mut b, &mut q, j);
    }

    Ok(Bidiagonal { q, b, r })
}

/// Expand a compact reflector store against a seed matrix.
///
/// The seed must be square with the store's row count (identity for a plain
/// orthogonal factor). Reflectors apply in reverse construction order, from
/// the innermost trailing block outward; β = 0 columns are no-op reflectors
/// and are skipped.
pub fn householder_apply<T: Precision>(
    h: &Matrix<T>,
    seed: Matrix<T>,
) -> Result<Matrix<T>, SVDError> {
    let (m, r) = *h.shape();
    let (seed_rows, seed_cols) = *seed.shape();
    if seed_rows != m || seed_cols != m {
        return Err(SVDError::SeedShapeMismatch {
            expected: m,
            rows: seed_rows,
            cols: seed_cols,
        });
    }

    let mut q = seed;
    for j in (0..r).rev() {
        let beta = h[[j, j]];
        if beta == T::zero() {
            continue;
        }
        // v[0] = 1 implicit; the tail sits below the store diagonal
        for col in j..m {
            let mut w = q[[j, col]];
            for i in j + 1..m {
                w += h[[i, j]] * q[[i, col]];
            }
            w = beta * w;
            q[[j, col]] -= w;
            for i in j + 1..m {
                q[[i, col]] -= h[[i, j]] * w;
            }
        }
    }
    Ok(q)
}
