//! General band matrix-vector kernel
//!
//! One launch covers every batch instance: block `(bx, b)` computes outputs
//! `bx * DIM_X .. (bx + 1) * DIM_X` of instance `b`. Inside the block, thread
//! `(tx, ty)` accumulates the diagonals (untransposed) or compact rows
//! (transposed) congruent to `ty` modulo `DIM_Y` for output `bx * DIM_X + tx`.
//! The `DIM_Y` partial sums of each output meet in shared memory and the
//! `ty == 0` row of threads folds them and applies the scale policy.

use super::common::{DIM_X, DIM_Y, scale_accumulate};
use crate::band::{Operation, in_band};
use crate::batch::{BatchOperand, Scalar};
use crate::dtype::Element;
use crate::runtime::{BlockContext, BlockKernel, DevicePtr, Dim3};

/// Partial sum of untransposed output `ind` over columns `ty, ty + DIM_Y, ...`
///
/// The compact row of `(ind, col)` is `ind + ku - col`; only cells inside the
/// band contribute.
///
/// # Safety
///
/// `a` must hold an `lda x n` compact band and `x` `n` elements at increment
/// `incx` (with `x` already shifted to logical element 0).
#[inline]
pub unsafe fn gbmvn_partial<T: Element>(
    ty: usize,
    ind: usize,
    m: usize,
    n: usize,
    kl: usize,
    ku: usize,
    a: DevicePtr<T>,
    lda: usize,
    x: DevicePtr<T>,
    incx: i64,
) -> T {
    let mut res = T::zero();
    if ind >= m {
        return res;
    }

    let mut col = ty;
    while col < n {
        if let Some(row) = (ind + ku).checked_sub(col) {
            if row <= kl + ku && in_band(row, col, ku, m) {
                let (ai, xi) = (row + col * lda, col as i64 * incx);
                res = res + unsafe { a.read(ai as i64) * x.read(xi) };
            }
        }
        col += DIM_Y as usize;
    }
    res
}

/// Partial sum of transposed output `ind` over compact rows
/// `ty, ty + DIM_Y, ...` of column `ind`
///
/// Row `row` of column `ind` pairs with `x[row - ku + ind]`. With `conj`
/// set, each matrix element is conjugated before the multiply.
///
/// # Safety
///
/// `a` must hold an `lda x n` compact band and `x` `m` elements at increment
/// `incx` (with `x` already shifted to logical element 0).
#[inline]
pub unsafe fn gbmvt_partial<T: Element>(
    ty: usize,
    ind: usize,
    m: usize,
    n: usize,
    kl: usize,
    ku: usize,
    a: DevicePtr<T>,
    lda: usize,
    x: DevicePtr<T>,
    incx: i64,
    conj: bool,
) -> T {
    let mut res = T::zero();
    if ind >= n {
        return res;
    }

    let col = ind;
    let mut row = ty;
    while row < lda {
        if row <= kl + ku && in_band(row, col, ku, m) {
            let mut elem = unsafe { a.read((row + col * lda) as i64) };
            if conj {
                elem = elem.conj();
            }
            let xi = (row + col - ku) as i64 * incx;
            res = res + elem * unsafe { x.read(xi) };
        }
        row += DIM_Y as usize;
    }
    res
}

/// Launch arguments of the batched gbmv kernel
///
/// `shift_*` are the normalized traversal shifts; `a`, `x` and `y` are the
/// unshifted batch operands.
#[derive(Clone, Copy, Debug)]
pub struct GbmvKernel<T> {
    /// Transpose mode
    pub trans: Operation,
    /// Logical rows
    pub m: usize,
    /// Logical columns
    pub n: usize,
    /// Sub-diagonals
    pub kl: usize,
    /// Super-diagonals
    pub ku: usize,
    /// Scalar on `op(A) x`
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

impl<T: Element> GbmvKernel<T> {
    /// Number of outputs per instance
    #[inline]
    pub fn output_len(&self) -> usize {
        self.trans.y_len(self.m, self.n)
    }

    /// Thread-block extent the kernel requires
    pub const fn block_dim() -> Dim3 {
        Dim3::xy(DIM_X, DIM_Y)
    }

    /// Tile computation for one instance once its operands are resolved
    fn tile(
        &self,
        block: &mut BlockContext<'_, Vec<T>>,
        alpha: T,
        a: DevicePtr<T>,
        x: DevicePtr<T>,
        beta: T,
        y: DevicePtr<T>,
    ) {
        let origin = block.block_idx().x as usize * DIM_X as usize;
        let out_len = self.output_len();

        if !alpha.is_zero() {
            block.threads(|t, sdata| {
                let (tx, ty) = (t.x as usize, t.y as usize);
                let ind = origin + tx;
                let partial = unsafe {
                    match self.trans {
                        Operation::None => gbmvn_partial(
                            ty, ind, self.m, self.n, self.kl, self.ku, a, self.lda, x, self.incx,
                        ),
                        Operation::Transpose | Operation::ConjugateTranspose => gbmvt_partial(
                            ty,
                            ind,
                            self.m,
                            self.n,
                            self.kl,
                            self.ku,
                            a,
                            self.lda,
                            x,
                            self.incx,
                            self.trans == Operation::ConjugateTranspose,
                        ),
                    }
                };
                sdata[tx + ty * DIM_X as usize] = partial;
            });
        }

        block.threads(|t, sdata| {
            let thread_id = (t.x + t.y * DIM_X) as usize;
            if thread_id >= DIM_X as usize {
                return;
            }
            let ind = origin + thread_id;
            if ind >= out_len {
                return;
            }

            let mut sum = T::zero();
            if !alpha.is_zero() {
                for i in 0..DIM_Y as usize {
                    sum = sum + sdata[thread_id + DIM_X as usize * i];
                }
            }
            unsafe { scale_accumulate(alpha, sum, beta, y, ind as i64 * self.incy) };
        });
    }
}

impl<T: Element> BlockKernel for GbmvKernel<T> {
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
        self.tile(block, alpha, a, x, beta, y);
    }
}
