//! Device kernels
//!
//! Each kernel is a [`BlockKernel`](crate::runtime::BlockKernel): a struct
//! carrying the launch arguments, run once per block of the launch grid.
//! Launchers in [`crate::blas1`] and [`crate::blas2`] build the kernel value
//! and the grid; nothing in this module validates arguments.
//!
//! ```text
//! common      scale-and-accumulate output policy
//! gbmv        general band matrix-vector product (64 x 16 tiles)
//! hbmv        Hermitian band matrix-vector product (64 x 16 tiles)
//! reduction   two-stage sum of magnitudes (512-thread blocks)
//! numerics    NaN / Inf / zero / denormal scan (512-thread blocks)
//! ```

pub mod common;
pub mod gbmv;
pub mod hbmv;
pub mod numerics;
pub mod reduction;
