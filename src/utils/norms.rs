//! Vector and matrix norm computations

use crate::precision::Precision;
use crate::{Matrix, Vector};

/// Compute the 2-norm (Euclidean norm) of a vector
pub fn norm_2<T: Precision>(vec: &Vector<T>) -> T {
    let mut sum = T::zero();
    let n = vec.len();
    for i in 0..n {
        let val = vec[[i]];
        sum += val * val;
    }
    sum.sqrt()
}

/// Compute the Frobenius norm of a matrix
pub fn norm_frobenius<T: Precision>(mat: &Matrix<T>) -> T {
    let (m, n) = *mat.shape();
    let mut sum = T::zero();
    for i in 0..m {
        for j in 0..n {
            let val = mat[[i, j]];
            sum += val * val;
        }
    }
    sum.sqrt()
}

/// Compute the maximum absolute value in a matrix
pub fn norm_max<T: Precision>(mat: &Matrix<T>) -> T {
    let (m, n) = *mat.shape();
    let mut max_val = T::zero();
    for i in 0..m {
        for j in 0..n {
            max_val = max_val.max(mat[[i, j]].abs());
        }
    }
    max_val
}
