//! Vector traversal with signed increments
//!
//! A BLAS vector of `len` logical elements with increment `inc` visits
//! `x[offset + i * inc]` for `i` in `0..len` when `inc > 0`. A negative
//! increment walks the same storage backwards: logical element `0` is the last
//! one in memory. Kernels only ever compute `shift + i * inc`, so the launcher
//! moves the shift to the last stored element once and the kernel never
//! branches on the sign.

/// Normalized traversal of one vector operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VectorTraversal {
    shift: i64,
    inc: i64,
}

impl VectorTraversal {
    /// Normalize `offset` for a vector of `len` elements with increment `inc`
    pub fn new(offset: i64, inc: i64, len: usize) -> Self {
        let shift = if inc < 0 && len > 0 {
            offset - inc * (len as i64 - 1)
        } else {
            offset
        };
        Self { shift, inc }
    }

    /// Element offset of logical element `0`
    #[inline]
    pub fn shift(&self) -> i64 {
        self.shift
    }

    /// Increment between logical elements
    #[inline]
    pub fn inc(&self) -> i64 {
        self.inc
    }

    /// Element offset of logical element `i`
    #[inline]
    pub fn index(&self, i: usize) -> i64 {
        self.shift + i as i64 * self.inc
    }
}
