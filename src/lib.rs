//! # xprec-linalg: Extended-Precision Bidiagonal SVD
//!
//! Singular value decomposition of tall matrices at double-double precision,
//! via Householder bidiagonalization and the Golub-Kahan implicit-shift QR
//! iteration with deflation.
//!
//! The scalar type is generic: the same code runs on `f64` and on
//! `twofloat::TwoFloat` through the [`Precision`] trait, and the low-level
//! arithmetic primitives are injected through the [`LinalgKernel`] trait so
//! the orchestration logic can be exercised against substitute backends.
//!
//! ```
//! use mdarray::Tensor;
//! use xprec_linalg::svd_f64;
//!
//! let a = Tensor::from_fn((4, 3), |idx| 1.0 / ((idx[0] + idx[1] + 1) as f64));
//! let result = svd_f64(&a).unwrap();
//! assert!(result.status.is_converged());
//! ```
//!
//! Returned singular values are neither sorted nor sign-normalized; see
//! [`SVDResult`] for the post-conditions callers must handle.

pub mod bidiag;
pub mod kernel;
pub mod precision;
pub mod svd;
pub mod utils;

pub use bidiag::{householder_apply, householder_bidiag, Bidiagonal};
pub use kernel::{DefaultKernel, GivensRotation, LinalgKernel, Tri2x2Svd};
pub use precision::Precision;
pub use svd::golub_kahan::{estimate_sbounds, golub_kahan_chase, golub_kahan_svd};
pub use svd::{
    svd, svd_f64, svd_twofloat, svd_twofloat_from_f64, svd_with, Convergence, SVDConfig,
    SVDError, SVDResult,
};
pub use utils::{eye, transpose};

// Re-export the array and scalar backends
pub use mdarray::{DTensor, Tensor};
pub use twofloat::TwoFloat;

// Type aliases for convenience
pub type Matrix<T> = Tensor<T, (usize, usize)>;
pub type Vector<T> = Tensor<T, (usize,)>;
