//! Numerics scan kernel
//!
//! Grid `(ceil(n / NB), batch)`, block `NB`. Every block classifies its slice
//! of one vector instance and writes one [`NumericFlags`] record to its own
//! slot; the host ORs the records together.

use super::reduction::NB;
use crate::batch::BatchOperand;
use crate::dtype::{Element, RealElement};
use crate::runtime::{BlockContext, BlockKernel, DevicePtr, Dim3};
use bytemuck::{Pod, Zeroable};

/// Presence flags for abnormal values, one `u32` per class (0 or 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct NumericFlags {
    /// Any NaN
    pub has_nan: u32,
    /// Any positive or negative infinity
    pub has_inf: u32,
    /// Any exact zero
    pub has_zero: u32,
    /// Any subnormal
    pub has_denorm: u32,
}

impl NumericFlags {
    /// Classify one real component
    #[inline]
    pub fn of_real<R: RealElement>(v: R) -> Self {
        Self {
            has_nan: v.is_nan() as u32,
            has_inf: v.is_infinite() as u32,
            has_zero: v.is_zero() as u32,
            has_denorm: v.is_subnormal() as u32,
        }
    }

    /// Classify an element; complex elements are abnormal if either part is
    #[inline]
    pub fn of<T: Element>(v: T) -> Self {
        let flags = Self::of_real(v.real());
        if T::DTYPE.is_complex() {
            // A complex zero needs both parts zero.
            let im = Self::of_real(v.imag());
            Self {
                has_nan: flags.has_nan | im.has_nan,
                has_inf: flags.has_inf | im.has_inf,
                has_zero: flags.has_zero & im.has_zero,
                has_denorm: flags.has_denorm | im.has_denorm,
            }
        } else {
            flags
        }
    }

    /// Union of two records
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            has_nan: self.has_nan | other.has_nan,
            has_inf: self.has_inf | other.has_inf,
            has_zero: self.has_zero | other.has_zero,
            has_denorm: self.has_denorm | other.has_denorm,
        }
    }
}

/// Launch arguments of the scan kernel
#[derive(Clone, Copy, Debug)]
pub struct NumericsScanKernel<T> {
    /// Elements per instance
    pub n: usize,
    /// Scanned vectors
    pub x: BatchOperand<T>,
    /// Normalized shift applied to every instance
    pub shift_x: i64,
    /// Increment
    pub incx: i64,
    /// One record per block, `blocks` per instance
    pub flags: DevicePtr<NumericFlags>,
    /// Blocks per instance
    pub blocks: usize,
}

impl<T: Element> BlockKernel for NumericsScanKernel<T> {
    type Shared = NumericFlags;

    fn shared_memory(&self, _block_dim: Dim3) -> NumericFlags {
        NumericFlags::default()
    }

    fn run_block(&self, block: &mut BlockContext<'_, NumericFlags>) {
        let bx = block.block_idx().x as usize;
        let batch = block.block_idx().y as usize;
        let x = unsafe { self.x.load(batch, self.shift_x) };

        block.threads(|t, acc| {
            if t.x == 0 {
                *acc = NumericFlags::default();
            }
        });
        block.threads(|t, acc| {
            let i = bx * NB as usize + t.x as usize;
            if i < self.n {
                let v = unsafe { x.read(i as i64 * self.incx) };
                *acc = acc.merge(NumericFlags::of(v));
            }
        });

        let mut record = NumericFlags::default();
        block.threads(|t, acc| {
            if t.x == 0 {
                record = *acc;
            }
        });
        unsafe {
            self.flags
                .write((batch * self.blocks + bx) as i64, record)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex64;

    #[test]
    fn test_classification() {
        assert_eq!(NumericFlags::of(f32::NAN).has_nan, 1);
        assert_eq!(NumericFlags::of(f64::INFINITY).has_inf, 1);
        assert_eq!(NumericFlags::of(0.0f32).has_zero, 1);
        assert_eq!(NumericFlags::of(f64::MIN_POSITIVE / 4.0).has_denorm, 1);
        assert_eq!(NumericFlags::of(1.0f32), NumericFlags::default());
    }

    #[test]
    fn test_complex_zero_needs_both_parts() {
        assert_eq!(NumericFlags::of(Complex64::new(0.0, 1.0)).has_zero, 0);
        assert_eq!(NumericFlags::of(Complex64::ZERO).has_zero, 1);
        assert_eq!(NumericFlags::of(Complex64::new(1.0, f32::NAN)).has_nan, 1);
    }
}
