//! Launch grid abstraction
//!
//! A kernel is launched over a grid of independent blocks; each block runs a
//! fixed number of threads that cooperate through block-local shared memory.
//!
//! # Execution Model
//!
//! ```text
//! grid (x: tiles, y: batch instances)
//! └── block (x * y * z threads)
//!     ├── shared memory (one per block, never aliased)
//!     └── phases: threads(..) ─ barrier ─ threads(..) ─ barrier ─ ...
//! ```
//!
//! A [`BlockKernel`] describes what one block does. Inside
//! [`BlockKernel::run_block`] every call to [`BlockContext::threads`] runs the
//! given closure once per thread of the block; returning from the call is the
//! block-wide barrier, so writes to shared memory made in one phase are
//! visible to every thread in the next. Blocks never synchronize with each
//! other.

/// Three-dimensional extent or index
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim3 {
    /// Fastest-varying axis
    pub x: u32,
    /// Middle axis
    pub y: u32,
    /// Slowest-varying axis
    pub z: u32,
}

impl Dim3 {
    /// Create a new extent
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Two-dimensional extent (`z = 1`)
    pub const fn xy(x: u32, y: u32) -> Self {
        Self { x, y, z: 1 }
    }

    /// Number of points in the extent
    #[inline]
    pub const fn volume(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Convert a linear index (x fastest) back to coordinates
    #[inline]
    pub const fn unflatten(self, linear: usize) -> Self {
        let x = linear % self.x as usize;
        let rest = linear / self.x as usize;
        let y = rest % self.y as usize;
        let z = rest / self.y as usize;
        Self::new(x as u32, y as u32, z as u32)
    }
}

/// Grid and block extents of one launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchGeometry {
    /// Number of blocks along each axis
    pub grid: Dim3,
    /// Number of threads per block along each axis
    pub block: Dim3,
}

impl LaunchGeometry {
    /// Create a launch geometry
    pub const fn new(grid: Dim3, block: Dim3) -> Self {
        Self { grid, block }
    }

    /// Total number of blocks
    #[inline]
    pub const fn num_blocks(&self) -> usize {
        self.grid.volume()
    }
}

/// Work done by one block of a launch
pub trait BlockKernel: Sync {
    /// Block-local shared memory
    type Shared: Send;

    /// Allocate shared memory for a block of `block_dim` threads
    ///
    /// Shared memory may be reused between blocks executed by the same
    /// worker; kernels must not rely on its contents at block start.
    fn shared_memory(&self, block_dim: Dim3) -> Self::Shared;

    /// Run one block to completion
    fn run_block(&self, block: &mut BlockContext<'_, Self::Shared>);
}

/// Per-block view handed to [`BlockKernel::run_block`]
pub struct BlockContext<'a, S> {
    block_idx: Dim3,
    block_dim: Dim3,
    grid_dim: Dim3,
    shared: &'a mut S,
}

impl<'a, S> BlockContext<'a, S> {
    pub(crate) fn new(block_idx: Dim3, block_dim: Dim3, grid_dim: Dim3, shared: &'a mut S) -> Self {
        Self {
            block_idx,
            block_dim,
            grid_dim,
            shared,
        }
    }

    /// Index of this block in the grid
    #[inline]
    pub fn block_idx(&self) -> Dim3 {
        self.block_idx
    }

    /// Threads per block
    #[inline]
    pub fn block_dim(&self) -> Dim3 {
        self.block_dim
    }

    /// Blocks per grid
    #[inline]
    pub fn grid_dim(&self) -> Dim3 {
        self.grid_dim
    }

    /// Run one phase: `f(thread_idx, shared)` for every thread, x fastest.
    ///
    /// Returning from this call is the block barrier.
    pub fn threads(&mut self, mut f: impl FnMut(Dim3, &mut S)) {
        let dim = self.block_dim;
        for z in 0..dim.z {
            for y in 0..dim.y {
                for x in 0..dim.x {
                    f(Dim3::new(x, y, z), &mut *self.shared);
                }
            }
        }
    }
}
