//! End-to-end factorization properties across shapes and failure modes

use mdarray::Tensor;
use xprec_linalg::utils::validation::{is_orthogonal, reconstruction_error};
use xprec_linalg::{svd_f64, svd_with, DefaultKernel, Matrix, SVDConfig, SVDError};

/// Hilbert-plus-identity test matrix, full rank and moderately conditioned.
fn structured(m: usize, n: usize) -> Matrix<f64> {
    Tensor::from_fn((m, n), |idx| {
        1.0 / ((idx[0] + idx[1] + 1) as f64) + if idx[0] == idx[1] { 1.0 } else { 0.0 }
    })
}

#[test]
fn factors_are_orthogonal_and_reconstruct_across_shapes() {
    for &(m, n) in &[(4, 3), (5, 5), (6, 2), (10, 4), (3, 1)] {
        let a = structured(m, n);
        let result = svd_f64(&a).unwrap();

        assert!(result.status.is_converged(), "{}x{} did not converge", m, n);
        assert_eq!(*result.u.shape(), (m, m));
        assert_eq!(result.s.len(), n);
        assert_eq!(*result.vt.shape(), (n, n));

        assert!(is_orthogonal(&result.u, 1e-13), "{}x{}: U not orthogonal", m, n);
        assert!(is_orthogonal(&result.vt, 1e-13), "{}x{}: Vt not orthogonal", m, n);

        let err = reconstruction_error(&a, &result.u, &result.s, &result.vt);
        println!("{}x{}: reconstruction error {:.6e}", m, n, err);
        assert!(err < 1e-12, "{}x{}: reconstruction error {:e}", m, n, err);
    }
}

#[test]
fn wide_and_empty_inputs_fail_fast() {
    let wide = Tensor::from_elem((3, 5), 1.0_f64);
    assert!(matches!(
        svd_f64(&wide),
        Err(SVDError::NotTall { rows: 3, cols: 5 })
    ));

    let empty = Tensor::from_elem((0, 0), 0.0_f64);
    assert!(matches!(svd_f64(&empty), Err(SVDError::EmptyMatrix)));
}

#[test]
fn singular_values_come_back_raw() {
    // Diagonal input: magnitudes are known, but order and signs are not
    // normalized by the engine
    let a: Matrix<f64> =
        Tensor::from_fn((2, 2), |idx| [[3.0, 0.0], [0.0, -5.0]][idx[0]][idx[1]]);
    let result = svd_f64(&a).unwrap();
    assert!(result.status.is_converged());

    let mut mags: Vec<f64> = result.s.iter().map(|x| x.abs()).collect();
    mags.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert!((mags[0] - 5.0).abs() < 1e-14);
    assert!((mags[1] - 3.0).abs() < 1e-14);

    let err = reconstruction_error(&a, &result.u, &result.s, &result.vt);
    assert!(err < 1e-14, "reconstruction error {:e}", err);
}

#[test]
fn tiny_sweep_cap_reports_and_returns_partial_state() {
    let a = structured(6, 4);
    let result = svd_with(&DefaultKernel, &a, SVDConfig { max_sweeps: 1 }).unwrap();

    assert!(!result.status.is_converged());
    assert_eq!(result.status.sweeps(), 1);

    // The partial factors are still orthogonal to working precision
    assert!(is_orthogonal(&result.u, 1e-13));
    assert!(is_orthogonal(&result.vt, 1e-13));
}

#[test]
fn repeated_calls_are_deterministic() {
    let a = structured(5, 4);
    let first = svd_f64(&a).unwrap();
    let second = svd_f64(&a).unwrap();

    assert_eq!(first.status, second.status);
    for k in 0..4 {
        assert_eq!(first.s[k], second.s[k]);
    }
    for i in 0..5 {
        for j in 0..5 {
            assert_eq!(first.u[[i, j]], second.u[[i, j]]);
        }
    }
}
