//! CPU runtime implementation
//!
//! The CPU runtime treats host memory as device memory and executes launch
//! grids in software. It is the reference executor for every bandr kernel.
//!
//! # Grid Execution
//!
//! Blocks are distributed over the rayon thread pool (`rayon` feature) or run
//! one after another. Each worker allocates shared memory once and reuses it
//! for every block it executes. The threads of a block run as lockstep phases
//! (see [`crate::runtime::grid`]).

mod client;
mod device;
mod runtime;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
