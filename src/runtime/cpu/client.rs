//! CPU client, allocator and grid executor

use super::device::CpuDevice;
use super::runtime::{CpuRuntime, allocate_aligned, deallocate_aligned};
use crate::error::Result;
use crate::runtime::grid::{BlockContext, BlockKernel, LaunchGeometry};
use crate::runtime::{DefaultAllocator, RuntimeClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// CPU client for kernel dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
    launches: Arc<AtomicU64>,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        let allocator = create_cpu_allocator(device.clone());
        Self {
            device,
            allocator,
            launches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of non-empty grids launched through this client (and its clones)
    pub fn kernel_launches(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU launches complete before `launch` returns, nothing to do
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }

    fn launch<K: BlockKernel>(&self, geometry: LaunchGeometry, kernel: &K) -> Result<()> {
        let num_blocks = geometry.num_blocks();
        if num_blocks == 0 || geometry.block.volume() == 0 {
            return Ok(());
        }
        self.launches.fetch_add(1, Ordering::Relaxed);

        let grid = geometry.grid;
        let block = geometry.block;
        let run = |shared: &mut K::Shared, linear: usize| {
            let mut ctx = BlockContext::new(grid.unflatten(linear), block, grid, shared);
            kernel.run_block(&mut ctx);
        };

        #[cfg(feature = "rayon")]
        {
            (0..num_blocks)
                .into_par_iter()
                .for_each_init(|| kernel.shared_memory(block), run);
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut shared = kernel.shared_memory(block);
            for linear in 0..num_blocks {
                run(&mut shared, linear);
            }
        }

        Ok(())
    }
}

/// CPU-specific allocator type alias
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

/// Create a CPU allocator for the given device
fn create_cpu_allocator(device: CpuDevice) -> CpuAllocator {
    DefaultAllocator::new(
        device,
        |size, _dev| allocate_aligned(size),
        |ptr, size, _dev| deallocate_aligned(ptr, size),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::grid::Dim3;
    use crate::runtime::{Allocator, DevicePtr, Runtime};

    /// Each block writes `block_idx.x + 100 * block_idx.y` after a two-phase
    /// shared-memory sum over its threads.
    struct BlockSum {
        out: DevicePtr<u32>,
    }

    impl BlockKernel for BlockSum {
        type Shared = Vec<u32>;

        fn shared_memory(&self, block_dim: Dim3) -> Vec<u32> {
            vec![0; block_dim.volume()]
        }

        fn run_block(&self, block: &mut BlockContext<'_, Vec<u32>>) {
            let b = block.block_idx();
            let dim = block.block_dim();
            block.threads(|t, s| s[t.x as usize] = 1);
            let mut total = 0;
            block.threads(|t, s| {
                if t.x == 0 {
                    total = s.iter().sum::<u32>();
                }
            });
            assert_eq!(total, dim.x);
            let index = (b.x + block.grid_dim().x * b.y) as i64;
            unsafe { self.out.write(index, b.x + 100 * b.y) };
        }
    }

    #[test]
    fn test_every_block_runs_once() {
        let client = CpuRuntime::default_client(&CpuRuntime::default_device());
        let mut out = vec![0u32; 6];
        let kernel = BlockSum {
            out: DevicePtr::from_host(out.as_mut_ptr()),
        };
        let geometry = LaunchGeometry::new(Dim3::xy(3, 2), Dim3::xy(8, 1));
        client.launch(geometry, &kernel).unwrap();

        assert_eq!(out, vec![0, 1, 2, 100, 101, 102]);
        assert_eq!(client.kernel_launches(), 1);
    }

    #[test]
    fn test_empty_grid_is_not_launched() {
        let client = CpuRuntime::default_client(&CpuRuntime::default_device());
        let kernel = BlockSum {
            out: DevicePtr::null(),
        };
        let geometry = LaunchGeometry::new(Dim3::xy(4, 0), Dim3::xy(8, 1));
        client.launch(geometry, &kernel).unwrap();
        assert_eq!(client.kernel_launches(), 0);
    }

    #[test]
    fn test_allocator_tracks_bytes() {
        let client = CpuRuntime::default_client(&CpuRuntime::default_device());
        let alloc = client.allocator();
        let ptr = alloc.allocate(128).unwrap();
        assert_eq!(alloc.allocated_bytes(), 128);
        alloc.deallocate(ptr, 128);
        assert_eq!(alloc.allocated_bytes(), 0);
    }
}
