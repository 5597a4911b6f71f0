//! Helpers shared by the matrix-vector kernels

use crate::dtype::Element;
use crate::runtime::DevicePtr;

/// Threads along x in a matrix-vector tile (one output element each)
pub const DIM_X: u32 = 64;

/// Threads along y in a matrix-vector tile (one partial sum each)
pub const DIM_Y: u32 = 16;

/// Number of tiles needed to cover `len` outputs
#[inline]
pub fn tiles_for(len: usize) -> u32 {
    len.div_ceil(DIM_X as usize) as u32
}

/// Output value of `y = alpha * sum + beta * y`
///
/// `y` is only read when its coefficient is nonzero, so a NaN or
/// uninitialized `y` is overwritten when `beta == 0`.
#[inline]
pub fn scaled_output<T: Element>(alpha: T, sum: T, beta: T, load_y: impl FnOnce() -> T) -> T {
    match (alpha.is_zero(), beta.is_zero()) {
        (true, true) => T::zero(),
        (true, false) => beta * load_y(),
        (false, true) => alpha * sum,
        (false, false) => alpha * sum + beta * load_y(),
    }
}

/// Apply [`scaled_output`] to `y[index]` in place
///
/// # Safety
///
/// `y.offset(index)` must be a live element owned by the calling thread.
#[inline]
pub unsafe fn scale_accumulate<T: Element>(alpha: T, sum: T, beta: T, y: DevicePtr<T>, index: i64) {
    let value = scaled_output(alpha, sum, beta, || unsafe { y.read(index) });
    unsafe { y.write(index, value) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        let never = || -> f64 { panic!("y must not be read") };
        assert_eq!(scaled_output(0.0, 7.0, 0.0, never), 0.0);
        assert_eq!(scaled_output(2.0, 7.0, 0.0, never), 14.0);
        assert_eq!(scaled_output(0.0, 7.0, 3.0, || 5.0), 15.0);
        assert_eq!(scaled_output(2.0, 7.0, 3.0, || 5.0), 29.0);
    }

    #[test]
    fn test_nan_overwritten_when_beta_zero() {
        let mut y = [f32::NAN];
        let p = DevicePtr::from_host(y.as_mut_ptr());
        unsafe { scale_accumulate(1.0, 4.0, 0.0, p, 0) };
        assert_eq!(y[0], 4.0);
    }

    #[test]
    fn test_tiles_for() {
        assert_eq!(tiles_for(0), 0);
        assert_eq!(tiles_for(64), 1);
        assert_eq!(tiles_for(65), 2);
    }
}
