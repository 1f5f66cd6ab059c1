//! Shared matrix helpers

pub mod norms;
pub mod validation;

pub use norms::{norm_2, norm_frobenius, norm_max};

use crate::precision::Precision;
use crate::Matrix;
use mdarray::Tensor;

/// Identity matrix of size n×n.
pub fn eye<T: Precision>(n: usize) -> Matrix<T> {
    Tensor::from_fn((n, n), |idx| {
        if idx[0] == idx[1] {
            T::one()
        } else {
            T::zero()
        }
    })
}

/// Transpose into a freshly allocated matrix.
pub fn transpose<T: Precision>(matrix: &Matrix<T>) -> Matrix<T> {
    let (m, n) = *matrix.shape();
    Tensor::from_fn((n, m), |idx| matrix[[idx[1], idx[0]]])
}
