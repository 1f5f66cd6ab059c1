//! Scalar abstraction over the supported precisions
//!
//! The engine is generic over [`Precision`], implemented here for `f64` and
//! for `twofloat::TwoFloat` (an unevaluated hi/lo pair carrying roughly twice
//! the significant digits of `f64`). The trait is implemented directly on the
//! scalar types; no newtype wrapper is involved.

use std::fmt::{Debug, Display};

use twofloat::TwoFloat;

/// Scalar operations required by the bidiagonalization and QR iteration.
///
/// `epsilon` is the representation epsilon of the type, i.e. the relative
/// spacing of adjacent representable values: `f64::EPSILON` for `f64` and
/// 2⁻¹⁰⁴ for double-double. Deflation thresholds derive from it.
pub trait Precision:
    Copy
    + Debug
    + Display
    + PartialEq
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
    + std::ops::AddAssign
    + std::ops::SubAssign
{
    /// Convert from f64, exactly where representable.
    fn from_f64(x: f64) -> Self;

    /// Round to the nearest f64.
    fn to_f64(self) -> f64;

    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// Representation epsilon (see trait docs).
    fn epsilon() -> Self;

    /// Absolute value.
    fn abs(self) -> Self;

    /// Square root.
    fn sqrt(self) -> Self;

    /// `sqrt(self² + other²)` without undue overflow.
    fn hypot(self, other: Self) -> Self;

    /// Magnitude of `self` with the sign of `sign`.
    fn copysign(self, sign: Self) -> Self;

    /// Larger of two values.
    fn max(self, other: Self) -> Self;

    /// Smaller of two values.
    fn min(self, other: Self) -> Self;

    /// True when neither NaN nor infinite.
    fn is_finite(self) -> bool;
}

impl Precision for f64 {
    fn from_f64(x: f64) -> Self {
        x
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn epsilon() -> Self {
        f64::EPSILON
    }

    #[inline]
    fn abs(self) -> Self {
        self.abs()
    }

    #[inline]
    fn sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn hypot(self, other: Self) -> Self {
        self.hypot(other)
    }

    #[inline]
    fn copysign(self, sign: Self) -> Self {
        self.copysign(sign)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        self.max(other)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        self.min(other)
    }

    fn is_finite(self) -> bool {
        self.is_finite()
    }
}

impl Precision for TwoFloat {
    fn from_f64(x: f64) -> Self {
        TwoFloat::from(x)
    }

    fn to_f64(self) -> f64 {
        self.into()
    }

    fn zero() -> Self {
        TwoFloat::from(0.0)
    }

    fn one() -> Self {
        TwoFloat::from(1.0)
    }

    fn epsilon() -> Self {
        // Double-double ulp: 2^-104
        TwoFloat::from(2.0_f64.powi(-104))
    }

    #[inline]
    fn abs(self) -> Self {
        TwoFloat::abs(&self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        self.sqrt()
    }

    #[inline]
    fn hypot(self, other: Self) -> Self {
        self.hypot(other)
    }

    #[inline]
    fn copysign(self, sign: Self) -> Self {
        if sign.is_sign_negative() {
            -self.abs()
        } else {
            self.abs()
        }
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    fn is_finite(self) -> bool {
        self.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn f64_roundtrip_and_constants() {
        assert_eq!(<f64 as Precision>::from_f64(1.5), 1.5);
        assert_eq!(1.5_f64.to_f64(), 1.5);
        assert_eq!(<f64 as Precision>::zero(), 0.0);
        assert_eq!(<f64 as Precision>::one(), 1.0);
        assert_eq!(<f64 as Precision>::epsilon(), f64::EPSILON);
    }

    #[test]
    fn twofloat_epsilon_matches_double_double_ulp() {
        let eps = <TwoFloat as Precision>::epsilon();
        // 2^-104 is about 4.93e-32
        assert!(eps > TwoFloat::from(4.9e-32));
        assert!(eps < TwoFloat::from(5.0e-32));
    }

    #[test]
    fn twofloat_carries_more_than_f64_digits() {
        // 1 + eps_dd is representable in double-double but collapses in f64
        let one = <TwoFloat as Precision>::one();
        let tiny = TwoFloat::from(1e-25);
        let x = one + tiny;
        assert!(x > one);
        assert_eq!(x.to_f64(), 1.0);
    }

    #[test]
    fn copysign_follows_sign_argument() {
        let x = TwoFloat::from(3.0);
        let neg = Precision::copysign(x, TwoFloat::from(-2.0));
        assert_abs_diff_eq!(neg.to_f64(), -3.0, epsilon = 1e-15);
        let pos = Precision::copysign(-x, TwoFloat::from(2.0));
        assert_abs_diff_eq!(pos.to_f64(), 3.0, epsilon = 1e-15);

        assert_eq!(Precision::copysign(1.0_f64, -0.5), -1.0);
        assert_eq!(Precision::copysign(-1.0_f64, 0.5), 1.0);
    }

    #[test]
    fn hypot_is_scale_safe() {
        let h = Precision::hypot(3.0_f64, 4.0_f64);
        assert_abs_diff_eq!(h, 5.0, epsilon = 1e-15);

        let h = Precision::hypot(TwoFloat::from(5.0), TwoFloat::from(12.0));
        assert_abs_diff_eq!(h.to_f64(), 13.0, epsilon = 1e-15);
    }

    #[test]
    fn min_max_orderings() {
        let a = TwoFloat::from(-2.0);
        let b = TwoFloat::from(7.0);
        assert_eq!(Precision::max(a, b).to_f64(), 7.0);
        assert_eq!(Precision::min(a, b).to_f64(), -2.0);
    }
}
