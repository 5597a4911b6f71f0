//! # bandr
//!
//! **Banded BLAS primitives on a grid-parallel device.**
//!
//! bandr computes banded matrix-vector products and vector magnitude sums
//! with the kernel structure of a GPU BLAS: tiled launch grids, block-shared
//! partial sums and one launch per call regardless of batch size.
//!
//! ## Operations
//!
//! - **gbmv**: `y = alpha * op(A) * x + beta * y` for a general banded `A`
//!   with `op` one of none, transpose or conjugate transpose
//! - **hbmv**: `y = alpha * A * x + beta * y` for a Hermitian banded `A`
//! - **asum**: `sum |re(x_i)| + |im(x_i)|`
//!
//! Every operation comes in three instance families (single, pointer-array
//! batched, strided batched) for `f32`, `f64`, `Complex64` and `Complex128`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bandr::prelude::*;
//!
//! let handle = Handle::<CpuRuntime>::new(HandleConfig::from_env());
//! let device = handle.device().clone();
//!
//! // 3x3 tridiagonal matrix in compact band storage (kl = ku = 1, lda = 3)
//! let layout = BandLayout::new(3, 3, 1, 1);
//! let a = DeviceBuffer::<CpuRuntime, f32>::from_slice(&layout.pack(&dense, 3), &device)?;
//! let x = DeviceBuffer::<CpuRuntime, f32>::from_slice(&[1.0, 1.0, 1.0], &device)?;
//! let y = DeviceBuffer::<CpuRuntime, f32>::zeroed(3, &device)?;
//!
//! // Operands are raw device addresses; the buffers must outlive the call
//! unsafe {
//!     handle.gbmv(
//!         Operation::None, 3, 3, 1, 1,
//!         Scalar::Host(1.0), a.ptr(), layout.lda,
//!         x.ptr(), 1,
//!         Scalar::Host(0.0), y.ptr(), 1,
//!     )?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): run the blocks of a launch grid on the rayon pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod band;
pub mod batch;
pub mod blas1;
pub mod blas2;
pub mod dtype;
pub mod error;
pub mod handle;
pub mod kernels;
pub mod logging;
pub mod numerics;
pub mod ops;
pub mod runtime;
pub mod traversal;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::band::{BandLayout, Fill, HermitianBandLayout, Operation};
    pub use crate::batch::{BandMatrixArg, BatchOperand, ResultArg, Scalar, VectorArg};
    pub use crate::dtype::{Complex64, Complex128, ComplexElement, DType, Element, RealElement};
    pub use crate::error::{Error, Result};
    pub use crate::handle::{CheckNumericsMode, Handle, HandleConfig, LayerMode};
    pub use crate::ops::{BandedOps, Level1Ops};
    pub use crate::runtime::cpu::CpuRuntime;
    pub use crate::runtime::{DeviceBuffer, DevicePtr, Device, Runtime, RuntimeClient};
}

/// Default runtime
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
