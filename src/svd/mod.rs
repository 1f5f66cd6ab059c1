//! Full SVD orchestration
//!
//! `svd` ties the pipeline together: bidiagonalize, expand the reflector
//! stores into orthogonal factors, then run the implicit-shift QR iteration
//! on the band while the factors absorb the rotations. The result carries a
//! convergence status instead of failing when the sweep cap is reached, so a
//! partial factorization stays usable.

pub mod golub_kahan;

use mdarray::Tensor;
use twofloat::TwoFloat;

use crate::bidiag::{householder_apply, householder_bidiag};
use crate::kernel::{DefaultKernel, LinalgKernel};
use crate::precision::Precision;
use crate::svd::golub_kahan::golub_kahan_svd;
use crate::utils::{eye, transpose};
use crate::Matrix;

/// Shape errors raised before any arithmetic starts.
#[derive(Debug, thiserror::Error)]
pub enum SVDError {
    #[error("Matrix is empty")]
    EmptyMatrix,

    #[error("Matrix must be tall: got {rows}x{cols}")]
    NotTall { rows: usize, cols: usize },

    #[error("Seed must be {expected}x{expected}: got {rows}x{cols}")]
    SeedShapeMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },
}

/// Outcome of the QR iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// Every super-diagonal entry fell below the negligibility threshold.
    Converged { sweeps: usize },
    /// The sweep cap was reached with live couplings left in the band.
    IterationCapExceeded { sweeps: usize },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    /// Number of chase sweeps performed.
    pub fn sweeps(&self) -> usize {
        match *self {
            Convergence::Converged { sweeps } => sweeps,
            Convergence::IterationCapExceeded { sweeps } => sweeps,
        }
    }
}

/// Factorization `A = U · diag(s) · Vᵗ` with square orthogonal factors.
///
/// `s` comes back in iteration order, not sorted, and entries may be
/// negative; callers wanting conventional singular values take magnitudes
/// and reorder, flipping the matching column of `u` or row of `vt` per sign.
#[derive(Debug, Clone)]
pub struct SVDResult<T> {
    /// Left factor, m×m.
    pub u: Matrix<T>,
    /// Diagonal of the middle factor, length n.
    pub s: Vec<T>,
    /// Transposed right factor, n×n.
    pub vt: Matrix<T>,
    /// Whether the iteration converged and in how many sweeps.
    pub status: Convergence,
}

/// Knobs for the QR iteration.
#[derive(Debug, Clone, Copy)]
pub struct SVDConfig {
    /// Cap on chase sweeps before giving up.
    pub max_sweeps: usize,
}

impl Default for SVDConfig {
    fn default() -> Self {
        Self { max_sweeps: 1000 }
    }
}

/// Full SVD of a tall matrix with an explicit kernel and configuration.
pub fn svd_with<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    a: &Matrix<T>,
    config: SVDConfig,
) -> Result<SVDResult<T>, SVDError> {
    let (m, n) = *a.shape();
    let bd = householder_bidiag(kernel, a)?;

    let mut u = householder_apply(&bd.q, eye(m))?;
    let v = householder_apply(&bd.r, eye(n))?;
    let mut vt = transpose(&v);

    let mut d = bd.diagonal();
    let mut f = bd.superdiagonal();
    let status = golub_kahan_svd(kernel, &mut d, &mut f, &mut u, &mut vt, config.max_sweeps);

    Ok(SVDResult {
        u,
        s: d,
        vt,
        status,
    })
}

/// Full SVD with the default kernel and sweep cap.
pub fn svd<T: Precision>(a: &Matrix<T>) -> Result<SVDResult<T>, SVDError> {
    svd_with(&DefaultKernel, a, SVDConfig::default())
}

/// Double-precision SVD.
pub fn svd_f64(a: &Matrix<f64>) -> Result<SVDResult<f64>, SVDError> {
    svd(a)
}

/// Double-double SVD.
pub fn svd_twofloat(a: &Matrix<TwoFloat>) -> Result<SVDResult<TwoFloat>, SVDError> {
    svd(a)
}

/// Promote a double-precision matrix to double-double and factorize it.
///
/// The promotion is exact, so the result's accuracy is limited only by the
/// extended-precision arithmetic, not by the input representation.
pub fn svd_twofloat_from_f64(a: &Matrix<f64>) -> Result<SVDResult<TwoFloat>, SVDError> {
    let (m, n) = *a.shape();
    let promoted: Matrix<TwoFloat> = Tensor::from_fn((m, n), |idx| TwoFloat::from(a[[idx[0], idx[1]]]));
    svd(&promoted)
}
