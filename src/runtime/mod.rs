//! Runtime backends for kernel execution
//!
//! This module defines the `Runtime` trait, device memory handles and the
//! launch-grid abstraction that bandr kernels are written against.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a compute unit)
//! ├── Client (launches kernels, synchronizes)
//! ├── Allocator (device memory with usage tracking)
//! └── DeviceBuffer / DevicePtr (caller-owned operands)
//! ```
//!
//! The only backend is [`cpu::CpuRuntime`], which executes launch grids on
//! the host: blocks in parallel, the threads of a block in lockstep phases.

mod allocator;
pub mod grid;
pub mod memory;
mod traits;

pub mod cpu;

pub use allocator::{Allocator, DefaultAllocator};
pub use grid::{BlockContext, BlockKernel, Dim3, LaunchGeometry};
pub use memory::{DeviceBuffer, DevicePtr};
pub use traits::{Device, Runtime, RuntimeClient};
