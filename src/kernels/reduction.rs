//! Two-stage magnitude reduction
//!
//! ```text
//! stage 1  grid (blocks, batch)  block NB   x[b] --> partials[b * blocks + bx]
//! stage 2  grid (1, batch)       block NB   partials[b * blocks ..] --> result[b]
//! ```
//!
//! Both stages fold their block with a shared-memory tree, halving the number
//! of active threads each phase.

use crate::batch::BatchOperand;
use crate::dtype::{Element, RealElement};
use crate::runtime::{BlockContext, BlockKernel, DevicePtr, Dim3};

/// Threads per reduction block
pub const NB: u32 = 512;

/// Number of stage-1 blocks per instance for `n` elements
#[inline]
pub fn reduction_blocks(n: usize) -> usize {
    n.div_ceil(NB as usize)
}

/// Workspace bytes needed to reduce `batch_count` instances of `n` elements:
/// one partial per block plus one result slot, per instance.
#[inline]
pub fn reduction_workspace_size<R: RealElement>(n: usize, batch_count: usize) -> usize {
    std::mem::size_of::<R>() * (reduction_blocks(n) + 1) * batch_count
}

/// Tree-reduce `sdata[0..NB]` into `sdata[0]`
fn tree_reduce<R: RealElement>(block: &mut BlockContext<'_, Vec<R>>) {
    let mut active = NB as usize / 2;
    while active > 0 {
        block.threads(|t, sdata| {
            let tid = t.x as usize;
            if tid < active {
                sdata[tid] = sdata[tid] + sdata[tid + active];
            }
        });
        active /= 2;
    }
}

/// Stage 1: per-block sums of `|re| + |im|`
#[derive(Clone, Copy, Debug)]
pub struct AsumPartialKernel<T: Element> {
    /// Elements per instance
    pub n: usize,
    /// Input vectors
    pub x: BatchOperand<T>,
    /// Shift applied to every instance
    pub shift_x: i64,
    /// Increment (positive)
    pub incx: i64,
    /// Partial sums, `blocks` per instance
    pub partials: DevicePtr<<T as Element>::Real>,
    /// Stage-1 blocks per instance
    pub blocks: usize,
}

impl<T: Element> BlockKernel for AsumPartialKernel<T> {
    type Shared = Vec<T::Real>;

    fn shared_memory(&self, block_dim: Dim3) -> Vec<T::Real> {
        vec![T::Real::zero(); block_dim.volume()]
    }

    fn run_block(&self, block: &mut BlockContext<'_, Vec<T::Real>>) {
        let bx = block.block_idx().x as usize;
        let batch = block.block_idx().y as usize;
        let x = unsafe { self.x.load(batch, self.shift_x) };

        block.threads(|t, sdata| {
            let tid = t.x as usize;
            let i = bx * NB as usize + tid;
            sdata[tid] = if i < self.n {
                unsafe { x.read(i as i64 * self.incx) }.abs1()
            } else {
                T::Real::zero()
            };
        });
        tree_reduce(block);

        let total = {
            let mut total = T::Real::zero();
            block.threads(|t, sdata| {
                if t.x == 0 {
                    total = sdata[0];
                }
            });
            total
        };
        unsafe {
            self.partials
                .write((batch * self.blocks + bx) as i64, total)
        };
    }
}

/// Stage 2: fold the partials of each instance into its result slot
#[derive(Clone, Copy, Debug)]
pub struct AsumFinalizeKernel<R> {
    /// Output of stage 1
    pub partials: DevicePtr<R>,
    /// Stage-1 blocks per instance
    pub blocks: usize,
    /// One result per instance
    pub result: DevicePtr<R>,
}

impl<R: RealElement> BlockKernel for AsumFinalizeKernel<R> {
    type Shared = Vec<R>;

    fn shared_memory(&self, block_dim: Dim3) -> Vec<R> {
        vec![R::zero(); block_dim.volume()]
    }

    fn run_block(&self, block: &mut BlockContext<'_, Vec<R>>) {
        let batch = block.block_idx().y as usize;
        let base = (batch * self.blocks) as i64;

        block.threads(|t, sdata| {
            let mut acc = R::zero();
            let mut i = t.x as usize;
            while i < self.blocks {
                acc = acc + unsafe { self.partials.read(base + i as i64) };
                i += NB as usize;
            }
            sdata[t.x as usize] = acc;
        });
        tree_reduce(block);

        let mut total = R::zero();
        block.threads(|t, sdata| {
            if t.x == 0 {
                total = sdata[0];
            }
        });
        unsafe { self.result.write(batch as i64, total) };
    }
}
