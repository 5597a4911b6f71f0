//! Element trait for mapping Rust types to DType

use super::{Complex64, Complex128, DType};
use bytemuck::{Pod, Zeroable};
use std::fmt::{Debug, Display};
use std::ops::{Add, Mul, Neg, Sub};

/// Trait for types that can be elements of a bandr operand
///
/// This trait connects Rust's type system to the runtime dtype system. It is
/// implemented for `f32`, `f64`, `Complex64` and `Complex128`.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - kernels copy elements freely across block threads
/// - `Pod + Zeroable` - device buffers are filled by byte casts (bytemuck)
/// - `Add + Sub + Mul + Neg` - arithmetic operations (Output = Self)
/// - `PartialEq` - exact comparisons against zero and one for the scale policy
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + Display
    + PartialEq
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Type of the real component (the type itself for real elements)
    type Real: RealElement;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;

    /// Complex conjugate (identity for real types)
    fn conj(self) -> Self;

    /// Real component
    fn real(self) -> Self::Real;

    /// Imaginary component (zero for real types)
    fn imag(self) -> Self::Real;

    /// Build an element with the given real part and zero imaginary part
    fn from_real(re: Self::Real) -> Self;

    /// Exact comparison against zero
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    /// BLAS magnitude: `|re| + |im|`
    ///
    /// This is the quantity summed by `asum`; for real types it is `|x|`.
    #[inline]
    fn abs1(self) -> Self::Real {
        self.real().abs() + self.imag().abs()
    }
}

/// Real scalar element (`f32` or `f64`)
pub trait RealElement: Element<Real = Self> + PartialOrd {
    /// Absolute value
    fn abs(self) -> Self;

    /// True if the value is NaN
    fn is_nan(self) -> bool;

    /// True if the value is positive or negative infinity
    fn is_infinite(self) -> bool;

    /// True if the value is subnormal (denormal)
    fn is_subnormal(self) -> bool;

    /// Widen to f64
    fn to_f64(self) -> f64;

    /// Narrow from f64
    fn from_f64(v: f64) -> Self;
}

/// Marker for complex element types
///
/// Hermitian operations are only defined for these.
pub trait ComplexElement: Element {}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
    type Real = f32;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn real(self) -> f32 {
        self
    }

    #[inline]
    fn imag(self) -> f32 {
        0.0
    }

    #[inline]
    fn from_real(re: f32) -> Self {
        re
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
    type Real = f64;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn real(self) -> f64 {
        self
    }

    #[inline]
    fn imag(self) -> f64 {
        0.0
    }

    #[inline]
    fn from_real(re: f64) -> Self {
        re
    }
}

impl RealElement for f32 {
    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline]
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }

    #[inline]
    fn is_subnormal(self) -> bool {
        f32::is_subnormal(self)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl RealElement for f64 {
    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline]
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }

    #[inline]
    fn is_subnormal(self) -> bool {
        f64::is_subnormal(self)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Element for Complex64 {
    const DTYPE: DType = DType::Complex64;
    type Real = f32;

    #[inline]
    fn zero() -> Self {
        Complex64::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex64::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn real(self) -> f32 {
        self.re
    }

    #[inline]
    fn imag(self) -> f32 {
        self.im
    }

    #[inline]
    fn from_real(re: f32) -> Self {
        Complex64::new(re, 0.0)
    }
}

impl Element for Complex128 {
    const DTYPE: DType = DType::Complex128;
    type Real = f64;

    #[inline]
    fn zero() -> Self {
        Complex128::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex128::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex128::conj(self)
    }

    #[inline]
    fn real(self) -> f64 {
        self.re
    }

    #[inline]
    fn imag(self) -> f64 {
        self.im
    }

    #[inline]
    fn from_real(re: f64) -> Self {
        Complex128::new(re, 0.0)
    }
}

impl ComplexElement for Complex64 {}
impl ComplexElement for Complex128 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs1_is_sum_of_component_magnitudes() {
        assert_eq!((-3.0f32).abs1(), 3.0);
        assert_eq!(Complex64::new(3.0, -4.0).abs1(), 7.0);
        assert_eq!(Complex128::new(-1.5, 2.5).abs1(), 4.0);
    }

    #[test]
    fn test_conj_real_is_identity() {
        assert_eq!(2.5f64.conj(), 2.5);
        assert_eq!(
            Element::conj(Complex128::new(1.0, 2.0)),
            Complex128::new(1.0, -2.0)
        );
    }

    #[test]
    fn test_is_zero() {
        assert!(0.0f32.is_zero());
        assert!((-0.0f64).is_zero());
        assert!(Complex64::ZERO.is_zero());
        assert!(!Complex64::I.is_zero());
    }

    #[test]
    fn test_real_classification() {
        assert!(RealElement::is_nan(f32::NAN));
        assert!(RealElement::is_infinite(f64::NEG_INFINITY));
        assert!(RealElement::is_subnormal(f32::MIN_POSITIVE / 2.0));
        assert!(!RealElement::is_subnormal(1.0f64));
    }
}
