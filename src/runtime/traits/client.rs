//! Trait for runtime clients that handle kernel dispatch

use super::Runtime;
use crate::error::Result;
use crate::runtime::grid::{BlockKernel, LaunchGeometry};

/// Trait for runtime clients that handle kernel dispatch
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending launches to complete
    fn synchronize(&self);

    /// Get the allocator for this client
    fn allocator(&self) -> &R::Allocator;

    /// Launch `kernel` over `geometry.grid` blocks of `geometry.block` threads.
    ///
    /// A grid with a zero-sized axis is a no-op. Blocks are independent and
    /// may run in any order; there is no synchronization between them.
    fn launch<K: BlockKernel>(&self, geometry: LaunchGeometry, kernel: &K) -> Result<()>;
}
