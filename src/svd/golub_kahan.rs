//! Implicit-shift QR iteration on a bidiagonal band
//!
//! One chase sweep introduces a shifted bulge at the top of the band and
//! drives it off the bottom with alternating right and left rotations; the
//! driver repeats sweeps over a shrinking active window until every
//! super-diagonal entry is negligible against the smallest-singular-value
//! estimate.

use crate::kernel::{GivensRotation, LinalgKernel};
use crate::precision::Precision;
use crate::svd::Convergence;
use crate::Matrix;

/// Singular value bounds of a bidiagonal matrix, as `(smax, smin)`.
///
/// `smax` is the largest band entry in magnitude; `smin` comes from running
/// the Golub-Kahan recurrences down and up the band and is a guaranteed
/// lower bound. `d` must be non-empty and `f` one entry shorter.
pub fn estimate_sbounds<T: Precision>(d: &[T], f: &[T]) -> (T, T) {
    let n = d.len();

    let mut lambda = d[n - 1].abs();
    let mut smin = lambda;
    for j in (0..n - 1).rev() {
        lambda = d[j].abs() * (lambda / (lambda + f[j].abs()));
        smin = smin.min(lambda);
    }

    let mut mu = d[0].abs();
    smin = smin.min(mu);
    for j in 0..n - 1 {
        mu = d[j + 1].abs() * (mu / (mu + f[j].abs()));
        smin = smin.min(mu);
    }

    let mut smax = T::zero();
    for v in d {
        smax = smax.max(v.abs());
    }
    for v in f {
        smax = smax.max(v.abs());
    }
    (smax, smin)
}

/// One implicit-shift QR sweep over the band `(d, e)`.
///
/// `d` holds the diagonal (length at least 2), `e` the super-diagonal (one
/// entry shorter). Mutates the band in place and returns the left and right
/// rotation sequences `(rot_u, rot_v)`; rotation k of either sequence acts
/// on the adjacent index pair `(k, k+1)` of the band.
pub fn golub_kahan_chase<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    d: &mut [T],
    e: &mut [T],
    shift: T,
) -> (Vec<GivensRotation<T>>, Vec<GivensRotation<T>>) {
    let n = d.len();
    let mut rot_u = Vec::with_capacity(n - 1);
    let mut rot_v = Vec::with_capacity(n - 1);

    // Seed the bulge from the shifted leading column of B^T B
    let mut f = (d[0].abs() - shift) * (T::one().copysign(d[0]) + shift / d[0]);
    let mut g = e[0];

    for i in 0..n - 1 {
        let (r, gv) = kernel.givens(f, g);
        if i > 0 {
            e[i - 1] = r;
        }
        f = gv.c * d[i] + gv.s * e[i];
        e[i] = gv.c * e[i] - gv.s * d[i];
        g = gv.s * d[i + 1];
        d[i + 1] = gv.c * d[i + 1];
        rot_v.push(gv);

        let (r, gu) = kernel.givens(f, g);
        d[i] = r;
        f = gu.c * e[i] + gu.s * d[i + 1];
        d[i + 1] = gu.c * d[i + 1] - gu.s * e[i];
        if i < n - 2 {
            g = gu.s * e[i + 1];
            e[i + 1] = gu.c * e[i + 1];
        }
        rot_u.push(gu);
    }

    e[n - 2] = f;
    (rot_u, rot_v)
}

/// Iterate QR sweeps until the band is diagonal or the sweep cap is hit.
///
/// `d` and `f` are the bidiagonal band; `u` (columns) and `vt` (rows) absorb
/// the accumulated rotations so that `u · B · vt` is invariant. On return
/// `d` holds the singular values, unsorted and with arbitrary signs.
pub fn golub_kahan_svd<T: Precision, K: LinalgKernel<T>>(
    kernel: &K,
    d: &mut [T],
    f: &mut [T],
    u: &mut Matrix<T>,
    vt: &mut Matrix<T>,
    max_sweeps: usize,
) -> Convergence {
    let n = d.len();
    if n == 0 {
        return Convergence::Converged { sweeps: 0 };
    }
    let mut n2 = n - 1;

    // Negligibility threshold, LAWN3 pages 6 and 22
    let (_, sigma_minus) = estimate_sbounds(d, f);
    let tol = T::from_f64(100.0) * T::epsilon();
    let thresh = tol * sigma_minus;

    for sweep in 0..max_sweeps {
        // Largest index whose super-diagonal entry is still live
        let mut live = None;
        for n2i in (1..=n2).rev() {
            if f[n2i - 1].abs() > thresh {
                live = Some(n2i);
                break;
            }
        }
        n2 = match live {
            Some(n2i) => n2i,
            None => return Convergence::Converged { sweeps: sweep },
        };

        // Widest block ending at n2: stop at the first negligible entry below
        let mut n1 = 0;
        for j in (0..n2).rev() {
            if f[j].abs() < thresh {
                n1 = j;
                break;
            }
        }

        if n1 == n2 {
            return Convergence::Converged { sweeps: sweep };
        }

        let (_, shift) = kernel.svvals_tri2x2(d[n2 - 1], f[n2 - 1], d[n2]);
        let (rot_u, rot_v) = golub_kahan_chase(kernel, &mut d[n1..=n2], &mut f[n1..n2], shift);
        for (k, rot) in rot_v.iter().enumerate() {
            kernel.rotate_rows(vt, n1 + k, n1 + k + 1, rot);
        }
        for (k, rot) in rot_u.iter().enumerate() {
            kernel.rotate_cols(u, n1 + k, n1 + k + 1, rot);
        }
    }

    Convergence::IterationCapExceeded { sweeps: max_sweeps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::DefaultKernel;
    use crate::utils::eye;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sbounds_of_decoupled_band_are_the_extremes() {
        let d = [3.0, -5.0, 2.0];
        let f = [0.0, 0.0];
        let (smax, smin) = estimate_sbounds(&d, &f);
        assert_eq!(smax, 5.0);
        assert_eq!(smin, 2.0);
    }

    #[test]
    fn sbounds_shrink_with_coupling() {
        // Backward recurrence: 3, then 2 * 3/(3+1) = 1.5
        let d = [2.0, 3.0];
        let f = [1.0];
        let (smax, smin) = estimate_sbounds(&d, &f);
        assert_eq!(smax, 3.0);
        assert_abs_diff_eq!(smin, 1.5, epsilon = 1e-15);
        // Never above the true smallest singular value
        let (_, true_min) = DefaultKernel.svvals_tri2x2(2.0, 1.0, 3.0);
        assert!(smin <= true_min + 1e-15);
    }

    #[test]
    fn chase_with_exact_shift_deflates_a_2x2() {
        let kernel = DefaultKernel;
        let mut d = [3.0, 2.0];
        let mut e = [1.0];
        let (_, shift) = kernel.svvals_tri2x2(d[0], e[0], d[1]);

        let (rot_u, rot_v) = golub_kahan_chase(&kernel, &mut d, &mut e, shift);
        assert_eq!(rot_u.len(), 1);
        assert_eq!(rot_v.len(), 1);

        // One exact-shift sweep drives the coupling to roundoff
        assert!(e[0].abs() < 1e-10, "left-over coupling {:e}", e[0]);
        // |det| = 6 is invariant under the two-sided rotations
        assert_abs_diff_eq!((d[0] * d[1]).abs(), 6.0, epsilon = 1e-12);
        // The shifted-for value settles at the bottom of the block
        assert_abs_diff_eq!(d[1].abs(), shift.abs(), epsilon = 1e-9);
    }

    #[test]
    fn chase_preserves_frobenius_mass() {
        let kernel = DefaultKernel;
        let mut d = [3.0, 2.0, 1.0];
        let mut e = [1.0, 0.5];
        let before: f64 = d.iter().map(|x| x * x).sum::<f64>() + e.iter().map(|x| x * x).sum::<f64>();

        let (_, shift) = kernel.svvals_tri2x2(d[1], e[1], d[2]);
        golub_kahan_chase(&kernel, &mut d, &mut e, shift);

        let after: f64 = d.iter().map(|x| x * x).sum::<f64>() + e.iter().map(|x| x * x).sum::<f64>();
        assert_abs_diff_eq!(before, after, epsilon = 1e-12);
    }

    #[test]
    fn driver_diagonalizes_and_tracks_factors() {
        let kernel = DefaultKernel;
        let mut d = vec![3.0, 1.0];
        let mut f = vec![0.5];
        let mut u = eye::<f64>(2);
        let mut vt = eye::<f64>(2);

        let status = golub_kahan_svd(&kernel, &mut d, &mut f, &mut u, &mut vt, 50);
        assert!(status.is_converged());
        assert!(f[0].abs() < 1e-12);

        // u * diag(d) * vt reproduces the starting band
        let b0 = [[3.0, 0.5], [0.0, 1.0]];
        for i in 0..2 {
            for j in 0..2 {
                let mut acc = 0.0;
                for k in 0..2 {
                    acc += u[[i, k]] * d[k] * vt[[k, j]];
                }
                assert_abs_diff_eq!(acc, b0[i][j], epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn trivial_diagonal_requires_caller_normalization() {
        // Already diagonal: immediate convergence, no sorting, signs untouched
        let kernel = DefaultKernel;
        let mut d = vec![3.0, -5.0];
        let mut f = vec![0.0];
        let mut u = eye::<f64>(2);
        let mut vt = eye::<f64>(2);

        let status = golub_kahan_svd(&kernel, &mut d, &mut f, &mut u, &mut vt, 10);
        assert!(matches!(status, Convergence::Converged { sweeps: 0 }));
        assert_eq!(d, vec![3.0, -5.0]);
        assert_eq!(u[[0, 0]], 1.0);
        assert_eq!(vt[[1, 1]], 1.0);
    }

    #[test]
    fn sweep_cap_of_zero_reports_no_convergence() {
        let kernel = DefaultKernel;
        let mut d = vec![3.0, 1.0];
        let mut f = vec![2.9];
        let mut u = eye::<f64>(2);
        let mut vt = eye::<f64>(2);

        let status = golub_kahan_svd(&kernel, &mut d, &mut f, &mut u, &mut vt, 0);
        assert!(!status.is_converged());
        assert_eq!(status.sweeps(), 0);
    }

    #[test]
    fn deflation_splits_at_negligible_entry() {
        // Exact zero in the middle: the two 2x2 blocks converge independently
        let kernel = DefaultKernel;
        let mut d = vec![5.0, 4.0, 3.0, 2.0];
        let mut f = vec![0.3, 0.0, 0.2];
        let mut u = eye::<f64>(4);
        let mut vt = eye::<f64>(4);

        let status = golub_kahan_svd(&kernel, &mut d, &mut f, &mut u, &mut vt, 50);
        assert!(status.is_converged());
        assert!(status.sweeps() <= 8, "took {} sweeps", status.sweeps());
        for fi in &f {
            assert!(fi.abs() < 1e-12);
        }

        // Frobenius mass of the band is preserved end to end
        let mass: f64 = d.iter().map(|x| x * x).sum();
        let expect = 25.0 + 16.0 + 9.0 + 4.0 + 0.09 + 0.04;
        assert_abs_diff_eq!(mass, expect, epsilon = 1e-12);
    }
}
