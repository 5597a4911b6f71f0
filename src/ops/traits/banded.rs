//! Banded matrix-vector operations trait
//!
//! This module defines the trait for products with banded matrices:
//! - General band (`gbmv`): `y = alpha * op(A) * x + beta * y`
//! - Hermitian band (`hbmv`): `y = alpha * A * x + beta * y`
//!
//! Band matrices use compact storage; see [`crate::band`].

use crate::band::{Fill, Operation};
use crate::batch::Scalar;
use crate::dtype::{ComplexElement, Element};
use crate::error::Result;
use crate::runtime::{DevicePtr, Runtime};

/// Banded matrix-vector products
///
/// # Scale Policy
///
/// For every output element:
///
/// ```text
/// alpha == 0, beta == 0   y = 0                 (y is not read)
/// alpha == 0, beta != 0   y = beta * y          (A and x are not read)
/// alpha != 0, beta == 0   y = alpha * op(A) x   (y is not read)
/// otherwise               y = alpha * op(A) x + beta * y
/// ```
///
/// With host scalars, `alpha == 0, beta == 1` returns before launching and
/// `A` and `x` may be null whenever `alpha == 0`.
///
/// # Safety
///
/// Operands are raw device addresses, so every method is `unsafe`. Each
/// address the call reads (as decided by the scale policy) must lie inside a
/// live allocation of `R`'s device large enough for its shape, increment and
/// batch stride: `lda * n` elements for `A`, `1 + (len - 1) * |inc|` for a
/// vector, one `T` for a device scalar and `batch_count` addresses for a
/// pointer array. `y` must not be accessed by anything else for the duration
/// of the call. Addresses taken from a [`DeviceBuffer`](crate::runtime::DeviceBuffer)
/// that outlives the call satisfy the first requirement when the buffer is
/// large enough.
///
/// Calling an operation outside an `unsafe` block does not compile:
///
/// ```compile_fail
/// # use bandr::prelude::*;
/// let handle = Handle::<CpuRuntime>::new(HandleConfig::default());
/// let y = DeviceBuffer::<CpuRuntime, f64>::zeroed(2, handle.device())?;
/// handle.gbmv(Operation::None, 2, 2, 0, 0, Scalar::Host(1.0), DevicePtr::from_addr(0x10), 1,
///     y.ptr(), 1, Scalar::Host(0.0), y.ptr(), 1)?;
/// # Ok::<(), bandr::error::Error>(())
/// ```
pub trait BandedOps<R: Runtime> {
    /// General band matrix-vector product
    ///
    /// # Arguments
    ///
    /// * `trans` - `op(A)`: `A`, `A^T` or `A^H`
    /// * `m`, `n` - Logical shape of `A`
    /// * `kl`, `ku` - Sub- and super-diagonals of `A`
    /// * `a`, `lda` - Compact storage, `lda >= kl + ku + 1`
    /// * `x`, `incx` - Input vector (`n` elements, `m` if transposed)
    /// * `y`, `incy` - Output vector (`m` elements, `n` if transposed)
    ///
    /// Negative increments traverse the vector backwards.
    ///
    /// # Errors
    ///
    /// - `InvalidValue` for `lda < kl + ku + 1`, a band or `lda x n` buffer
    ///   too large to address, a zero increment, or `alpha` and `beta` of
    ///   different residency
    /// - `InvalidPointer` for a null scalar or a null operand that is needed
    /// - `CheckNumericsFail` if numerics checks run in fail mode and find
    ///   abnormal values in `x` (before) or `y` (after)
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    ///
    /// # Example
    ///
    /// ```
    /// # use bandr::prelude::*;
    /// let handle = Handle::<CpuRuntime>::new(HandleConfig::default());
    /// let device = handle.device().clone();
    /// // [[2, 1], [1, 2]] with kl = ku = 1: compact columns [*, 2, 1] and [1, 2, *]
    /// let a = DeviceBuffer::<CpuRuntime, f64>::from_slice(&[0.0, 2.0, 1.0, 1.0, 2.0, 0.0], &device)?;
    /// let x = DeviceBuffer::<CpuRuntime, f64>::from_slice(&[1.0, 1.0], &device)?;
    /// let y = DeviceBuffer::<CpuRuntime, f64>::zeroed(2, &device)?;
    ///
    /// // SAFETY: a, x and y are live buffers sized for a 2 x 2 band with lda = 3
    /// unsafe {
    ///     handle.gbmv(Operation::None, 2, 2, 1, 1, Scalar::Host(1.0), a.ptr(), 3,
    ///         x.ptr(), 1, Scalar::Host(0.0), y.ptr(), 1)?;
    /// }
    /// assert_eq!(y.to_vec()?, vec![3.0, 3.0]);
    /// # Ok::<(), bandr::error::Error>(())
    /// ```
    unsafe fn gbmv<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        x: DevicePtr<T>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
    ) -> Result<()>;

    /// [`gbmv`](Self::gbmv) over `batch_count` instances whose operands are
    /// listed in device pointer arrays
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    unsafe fn gbmv_batched<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<DevicePtr<T>>,
        lda: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<DevicePtr<T>>,
        incy: i64,
        batch_count: usize,
    ) -> Result<()>;

    /// [`gbmv`](Self::gbmv) over `batch_count` instances laid out at fixed
    /// element strides
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    unsafe fn gbmv_strided_batched<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        stride_a: i64,
        x: DevicePtr<T>,
        incx: i64,
        stride_x: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
        stride_y: i64,
        batch_count: usize,
    ) -> Result<()>;

    /// Hermitian band matrix-vector product
    ///
    /// `A` is `n x n` with `k` off-diagonals on each side; only the `fill`
    /// triangle is stored (`lda >= k + 1`) and the imaginary parts of its
    /// diagonal are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`gbmv`](Self::gbmv), with `lda < k + 1` invalid.
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    unsafe fn hbmv<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        x: DevicePtr<T>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
    ) -> Result<()>;

    /// [`hbmv`](Self::hbmv) over `batch_count` instances whose operands are
    /// listed in device pointer arrays
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    unsafe fn hbmv_batched<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<DevicePtr<T>>,
        lda: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<DevicePtr<T>>,
        incy: i64,
        batch_count: usize,
    ) -> Result<()>;

    /// [`hbmv`](Self::hbmv) over `batch_count` instances laid out at fixed
    /// element strides
    ///
    /// # Safety
    ///
    /// See the [trait documentation](BandedOps#safety).
    unsafe fn hbmv_strided_batched<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        stride_a: i64,
        x: DevicePtr<T>,
        incx: i64,
        stride_x: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
        stride_y: i64,
        batch_count: usize,
    ) -> Result<()>;
}
