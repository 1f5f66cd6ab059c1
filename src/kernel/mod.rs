//! Arithmetic kernel behind the bidiagonalization and QR iteration
//!
//! The engine never calls scalar math directly for its structural operations;
//! it goes through [`LinalgKernel`], an injected capability trait covering the
//! stable norm, reflector and rotation construction, rotation application and
//! the closed-form 2×2 upper-triangular SVD. [`DefaultKernel`] implements the
//! trait for every [`Precision`] scalar; tests substitute instrumented
//! kernels to observe the orchestration logic in isolation.

use crate::precision::Precision;
use crate::Matrix;

/// Plane rotation `[[c, s], [-s, c]]` acting on an adjacent row or column pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GivensRotation<T> {
    /// Cosine component.
    pub c: T,
    /// Sine component.
    pub s: T,
}

impl<T: Precision> GivensRotation<T> {
    pub fn identity() -> Self {
        Self {
            c: T::one(),
            s: T::zero(),
        }
    }

    /// Rotate the pair `(x, y)`: returns `(c·x + s·y, c·y − s·x)`.
    #[inline]
    pub fn apply(&self, x: T, y: T) -> (T, T) {
        (self.c * x + self.s * y, self.c * y - self.s * x)
    }

    pub fn transpose(&self) -> Self {
        Self {
            c: self.c,
            s: -self.s,
        }
    }
}

/// Closed-form SVD of a 2×2 upper-triangular block `M = [[f, g], [0, h]]`.
///
/// Satisfies `rot_u · M · rot_vᵗ = diag(smax, smin)` with `|smax| ≥ |smin|`;
/// the extremal values carry signs, their magnitudes are the singular values.
#[derive(Debug, Clone, Copy)]
pub struct Tri2x2Svd<T> {
    pub rot_u: GivensRotation<T>,
    pub smax: T,
    pub smin: T,
    pub rot_v: GivensRotation<T>,
}

/// Extended-precision primitives required by the engine.
///
/// All operations must be at least as accurate as the scalar type itself;
/// the engine relies on them for its numerical guarantees but never on any
/// particular rounding of theirs.
pub trait LinalgKernel<T: Precision> {
    /// Numerically stable Euclidean norm of a vector.
    fn norm(&self, x: &[T]) -> T;

    /// Construct a rotation zeroing the second component of `(f, g)`.
    ///
    /// Returns `(r, G)` with `G·[f, g]ᵗ = [r, 0]ᵗ`.
    fn givens(&self, f: T, g: T) -> (T, GivensRotation<T>);

    /// Construct a Householder reflector `H = I − β·v·vᵗ` zeroing all but the
    /// first entry of `x`, with `v[0] = 1` by convention.
    ///
    /// Returns `(β, v)`; a zero input yields `β = 0` and the unit vector, a
    /// no-op reflector that downstream passes skip.
    fn householder(&self, x: &[T]) -> (T, Vec<T>);

    /// Apply `rot` in place to rows `k` and `q` of `target`.
    fn rotate_rows(&self, target: &mut Matrix<T>, k: usize, q: usize, rot: &GivensRotation<T>);

    /// Apply `rot` in place to columns `k` and `q` of `target`.
    ///
    /// Column orientation of [`LinalgKernel::rotate_rows`]: acting on columns
    /// of `target` is acting on rows of `targetᵗ`, same formula.
    fn rotate_cols(&self, target: &mut Matrix<T>, k: usize, q: usize, rot: &GivensRotation<T>);

    /// Closed-form SVD of the upper-triangular block `[[f, g], [0, h]]`.
    fn svd_tri2x2(&self, f: T, g: T, h: T) -> Tri2x2Svd<T>;

    /// Singular values of the block only, non-negative, as `(smax, smin)`.
    fn svvals_tri2x2(&self, f: T, g: T, h: T) -> (T, T);
}

/// Default arithmetic backend, valid for any [`Precision`] scalar.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKernel;

impl<T: Precision> LinalgKernel<T> for DefaultKernel {
    fn norm(&self, x: &[T]) -> T {
        let mut amax = T::zero();
        for &v in x {
            amax = amax.max(v.abs());
        }
        if amax == T::zero() {
            return T::zero();
        }
        // Rescale so the squares cannot overflow
        let mut sum = T::zero();
        for &v in x {
            let r = v / amax;
            sum += r * r;
        }
        amax * sum.sqrt()
    }

    fn givens(&self, f: T, g: T) -> (T, GivensRotation<T>) {
        if g == T::zero() {
            return (f, GivensRotation::identity());
        }
        if f == T::zero() {
            return (
                g,
                GivensRotation {
                    c: T::zero(),
                    s: T::one(),
                },
            );
        }
        let r = f.hypot(g);
        (
            r,
            GivensRotation {
                c: f / r,
                s: g / r,
            },
        )
    }

    fn householder(&self, x: &[T]) -> (T, Vec<T>) {
        let norm_x = self.norm(x);
        if norm_x == T::zero() {
            let mut v = vec![T::zero(); x.len()];
            v[0] = T::one();
            return (T::zero(), v);
        }
        // Reflection sign matches x[0] so x[0] + nu cannot cancel
        let nu = norm_x.copysign(x[0]);
        let v0 = x[0] + nu;
        let beta = v0 / nu;
        let mut v = Vec::with_capacity(x.len());
        v.push(T::one());
        for &xi in &x[1..] {
            v.push(xi / v0);
        }
        (beta, v)
    }

    fn rotate_rows(&self, target: &mut Matrix<T>, k: usize, q: usize, rot: &GivensRotation<T>) {
        let (_, ncols) = *target.shape();
        for j in 0..ncols {
            let xj = target[[k, j]];
            let yj = target[[q, j]];
            let (new_xj, new_yj) = rot.apply(xj, yj);
            target[[k, j]] = new_xj;
            target[[q, j]] = new_yj;
        }
    }

    fn rotate_cols(&self, target: &mut Matrix<T>, k: usize, q: usize, rot: &GivensRotation<T>) {
        let (nrows, _) = *target.shape();
        for i in 0..nrows {
            let xi = target[[i, k]];
            let yi = target[[i, q]];
            let (new_xi, new_yi) = rot.apply(xi, yi);
            target[[i, k]] = new_xi;
            target[[i, q]] = new_yi;
        }
    }

    fn svd_tri2x2(&self, f: T, g: T, h: T) -> Tri2x2Svd<T> {
        let zero = T::zero();
        let one = T::one();
        let two = T::from_f64(2.0);
        let half = T::from_f64(0.5);
        let four = T::from_f64(4.0);

        let mut ft = f;
        let mut fa = f.abs();
        let mut ht = h;
        let mut ha = h.abs();

        // pmax tracks which entry dominates: 1 = f, 2 = g, 3 = h
        let mut pmax = 1;
        let swap = ha > fa;
        if swap {
            pmax = 3;
            std::mem::swap(&mut ft, &mut ht);
            std::mem::swap(&mut fa, &mut ha);
        }
        // Now fa >= ha
        let gt = g;
        let ga = gt.abs();

        let mut clt = zero;
        let mut slt = zero;
        let mut crt = zero;
        let mut srt = zero;
        let mut ssmin = zero;
        let mut ssmax = zero;

        if ga == zero {
            // Already diagonal
            ssmin = ha;
            ssmax = fa;
            clt = one;
            crt = one;
        } else {
            let mut gasmal = true;
            if ga > fa {
                pmax = 2;
                if fa / ga < T::epsilon() {
                    // g dominates by more than a full precision's worth
                    gasmal = false;
                    ssmax = ga;
                    ssmin = if ha > one {
                        fa / (ga / ha)
                    } else {
                        (fa / ga) * ha
                    };
                    clt = one;
                    slt = ht / gt;
                    srt = one;
                    crt = ft / gt;
                }
            }
            if gasmal {
                let d = fa - ha;
                let l = if d == fa { one } else { d / fa };
                let m = gt / ft;
                let t = two - l;
                let mm = m * m;
                let tt = t * t;
                let s = (tt + mm).sqrt();
                let r = if l == zero {
                    m.abs()
                } else {
                    (l * l + mm).sqrt()
                };
                let a = half * (s + r);
                ssmin = ha / a;
                ssmax = fa * a;
                let tau = if mm == zero {
                    // m underflowed; rebuild the tangent from signs alone
                    if l == zero {
                        two.copysign(ft) * one.copysign(gt)
                    } else {
                        gt / d.copysign(ft) + m / t
                    }
                } else {
                    (m / (s + t) + m / (r + l)) * (one + a)
                };
                let len = (tau * tau + four).sqrt();
                crt = two / len;
                srt = tau / len;
                clt = (crt + srt * m) / a;
                slt = (ht / ft) * srt / a;
            }
        }

        let (csl, snl, csr, snr) = if swap {
            (srt, crt, slt, clt)
        } else {
            (clt, slt, crt, srt)
        };

        // Restore the signs consistent with the dominant entry
        let tsign = match pmax {
            1 => one.copysign(csr) * one.copysign(csl) * one.copysign(f),
            2 => one.copysign(snr) * one.copysign(csl) * one.copysign(g),
            _ => one.copysign(snr) * one.copysign(snl) * one.copysign(h),
        };
        ssmax = ssmax.copysign(tsign);
        ssmin = ssmin.copysign(tsign * one.copysign(f) * one.copysign(h));

        Tri2x2Svd {
            rot_u: GivensRotation { c: csl, s: snl },
            smax: ssmax,
            smin: ssmin,
            rot_v: GivensRotation { c: csr, s: snr },
        }
    }

    fn svvals_tri2x2(&self, f: T, g: T, h: T) -> (T, T) {
        let zero = T::zero();
        let one = T::one();
        let two = T::from_f64(2.0);

        let fa = f.abs();
        let ga = g.abs();
        let ha = h.abs();
        let fhmn = fa.min(ha);
        let fhmx = fa.max(ha);

        if fhmn == zero {
            let ssmax = if fhmx == zero {
                ga
            } else {
                let ratio = fhmx.min(ga) / fhmx.max(ga);
                fhmx.max(ga) * (one + ratio * ratio).sqrt()
            };
            return (ssmax, zero);
        }

        if ga < fhmx {
            let au = (ga / fhmx) * (ga / fhmx);
            let bs = one + fhmn / fhmx;
            let bt = (fhmx - fhmn) / fhmx;
            let c = two / ((bs * bs + au).sqrt() + (bt * bt + au).sqrt());
            (fhmx / c, fhmn * c)
        } else {
            let au = fhmx / ga;
            if au == zero {
                // ga so large the quotient underflowed; the product form below
                // would lose everything, the direct ratio does not
                (ga, (fhmn * fhmx) / ga)
            } else {
                let bs = one + fhmn / fhmx;
                let bt = (fhmx - fhmn) / fhmx;
                let bsu = bs * au;
                let btu = bt * au;
                let c = one / ((one + bsu * bsu).sqrt() + (one + btu * btu).sqrt());
                let ssmin = (fhmn * c) * au;
                (ga / (c + c), ssmin + ssmin)
            }
        }
    }
}
