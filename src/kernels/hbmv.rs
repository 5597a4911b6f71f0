//! Hermitian band matrix-vector kernel
//!
//! Same tiling as [`super::gbmv`]: block `(bx, b)` owns outputs
//! `bx * DIM_X ..` of instance `b`, thread `(tx, ty)` accumulates the
//! diagonals `d = ty, ty + DIM_Y, ...` of row `bx * DIM_X + tx`. Elements of
//! the unstored triangle are the conjugates of their mirrors.

use super::common::{DIM_X, DIM_Y, scale_accumulate};
use crate::band::{Fill, HermitianBandLayout};
use crate::batch::{BatchOperand, Scalar};
use crate::dtype::ComplexElement;
use crate::runtime::{BlockContext, BlockKernel, DevicePtr, Dim3};

/// Partial sum of output row `ind` over diagonals `ty, ty + DIM_Y, ...`
///
/// Diagonal `d` in `0..=2k` is logical column `ind + d - k`.
///
/// # Safety
///
/// `a` must hold `layout.storage_len()` elements and `x` `n` elements at
/// increment `incx` (already shifted to logical element 0).
#[inline]
pub unsafe fn hbmv_partial<T: ComplexElement>(
    ty: usize,
    ind: usize,
    layout: &HermitianBandLayout,
    a: DevicePtr<T>,
    x: DevicePtr<T>,
    incx: i64,
) -> T {
    let mut res = T::zero();
    if ind >= layout.n {
        return res;
    }

    let mut d = ty;
    while d <= 2 * layout.k {
        let col = (ind + d).checked_sub(layout.k).filter(|&j| j < layout.n);
        if let Some(col) = col {
            if let Some((idx, mirrored)) = layout.source(ind, col) {
                let stored = unsafe { a.read(idx as i64) };
                let elem = if ind == col {
                    T::from_real(stored.real())
                } else if mirrored {
                    stored.conj()
                } else {
                    stored
                };
                res = res + elem * unsafe { x.read(col as i64 * incx) };
            }
        }
        d += DIM_Y as usize;
    }
    res
}

/// Launch arguments of the batched hbmv kernel
#[derive(Clone, Copy, Debug)]
pub struct HbmvKernel<T> {
    /// Stored triangle
    pub fill: Fill,
    /// Order of the matrix
    pub n: usize,
    /// Off-diagonals
    pub k: usize,
    /// Scalar on `A x`
    pub alpha: Scalar<T>,
    /// Compact band storage
    pub a: BatchOperand<T>,
    /// Shift applied to every `A` instance
    pub shift_a: i64,
    /// Leading dimension of `A`
    pub lda: usize,
    /// Input vector
    pub x: BatchOperand<T>,
    /// Shift applied to every `x` instance
    pub shift_x: i64,
    /// Increment of `x`
    pub incx: i64,
    /// Scalar on `y`
    pub beta: Scalar<T>,
    /// Output vector
    pub y: BatchOperand<T>,
    /// Shift applied to every `y` instance
    pub shift_y: i64,
    /// Increment of `y`
    pub incy: i64,
}

impl<T: ComplexElement> BlockKernel for HbmvKernel<T> {
    type Shared = Vec<T>;

    fn shared_memory(&self, block_dim: Dim3) -> Vec<T> {
        vec![T::zero(); block_dim.volume()]
    }

    fn run_block(&self, block: &mut BlockContext<'_, Vec<T>>) {
        if block.block_dim().volume() != (DIM_X * DIM_Y) as usize {
            return;
        }
        let batch = block.block_idx().y as usize;

        let (alpha, beta) = unsafe { (self.alpha.load(), self.beta.load()) };
        if alpha.is_zero() && beta == T::one() {
            return;
        }

        let needs_ax = !alpha.is_zero();
        let (a, x, y) = unsafe {
            (
                self.a.cond_load(needs_ax, batch, self.shift_a),
                self.x.cond_load(needs_ax, batch, self.shift_x),
                self.y.load(batch, self.shift_y),
            )
        };

        let layout = HermitianBandLayout {
            n: self.n,
            k: self.k,
            lda: self.lda,
            fill: self.fill,
        };
        let origin = block.block_idx().x as usize * DIM_X as usize;

        if needs_ax {
            block.threads(|t, sdata| {
                let (tx, ty) = (t.x as usize, t.y as usize);
                sdata[tx + ty * DIM_X as usize] =
                    unsafe { hbmv_partial(ty, origin + tx, &layout, a, x, self.incx) };
            });
        }

        block.threads(|t, sdata| {
            if t.y != 0 {
                return;
            }
            let tx = t.x as usize;
            let ind = origin + tx;
            if ind >= self.n {
                return;
            }
            let mut sum = T::zero();
            if needs_ax {
                for i in 0..DIM_Y as usize {
                    sum = sum + sdata[tx + DIM_X as usize * i];
                }
            }
            unsafe { scale_accumulate(alpha, sum, beta, y, ind as i64 * self.incy) };
        });
    }
}
