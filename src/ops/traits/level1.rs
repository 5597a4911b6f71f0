//! Level-1 operations trait

use crate::batch::ResultArg;
use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::{DevicePtr, Runtime};

/// Vector reductions
///
/// # Safety
///
/// Operands are raw device addresses, so every method is `unsafe`. When there
/// is something to sum, `x` must address `1 + (n - 1) * incx` elements of a
/// live allocation of `R`'s device for every instance (and a pointer array
/// `batch_count` addresses). A device `result` must hold `batch_count`
/// elements that nothing else accesses during the call.
pub trait Level1Ops<R: Runtime> {
    /// Sum of magnitudes: `result = sum_i |re(x_i)| + |im(x_i)|`
    ///
    /// # Arguments
    ///
    /// * `n` - Number of elements
    /// * `x` - Vector storage
    /// * `incx` - Increment between elements; `incx <= 0` yields zero
    /// * `result` - One real value, on the host or the device
    ///
    /// # Errors
    ///
    /// - `InvalidPointer` if `result` is a null device address, or `x` is
    ///   null while there is something to sum
    /// - `MemoryError` if the workspace cannot be acquired
    ///
    /// # Safety
    ///
    /// See the [trait documentation](Level1Ops#safety).
    ///
    /// # Example
    ///
    /// ```
    /// # use bandr::prelude::*;
    /// let handle = Handle::<CpuRuntime>::new(HandleConfig::default());
    /// let x = DeviceBuffer::<CpuRuntime, f32>::from_slice(&[1.0, -2.0, 3.0], handle.device())?;
    /// let mut sum = [0.0f32];
    /// // SAFETY: x is a live buffer of 3 elements
    /// unsafe { handle.asum(3, x.ptr(), 1, ResultArg::Host(&mut sum))? };
    /// assert_eq!(sum[0], 6.0);
    /// # Ok::<(), bandr::error::Error>(())
    /// ```
    unsafe fn asum<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<T>,
        incx: i64,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()>;

    /// [`asum`](Self::asum) over `batch_count` vectors listed in a device
    /// pointer array; `result` receives one value per vector.
    ///
    /// # Safety
    ///
    /// See the [trait documentation](Level1Ops#safety).
    unsafe fn asum_batched<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        batch_count: usize,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()>;

    /// [`asum`](Self::asum) over `batch_count` vectors `stridex` elements
    /// apart; `result` receives one value per vector.
    ///
    /// # Safety
    ///
    /// See the [trait documentation](Level1Ops#safety).
    unsafe fn asum_strided_batched<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<T>,
        incx: i64,
        stridex: i64,
        batch_count: usize,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()>;
}
