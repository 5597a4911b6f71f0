//! Level-2 banded operations: matrix-vector products
//!
//! Each operation is split the same way:
//!
//! - `*_arg_check`: validation, no device access
//! - `*_launcher`: traversal normalization, grid geometry and one launch
//! - `*_template`: the full call (size query, logging, checks, launch)
//!
//! The public entry points are [`crate::ops::BandedOps`] on a handle.

pub mod gbmv;
pub mod hbmv;

pub use gbmv::{GbmvArgs, gbmv_arg_check, gbmv_check_numerics, gbmv_launcher, gbmv_template};
pub use hbmv::{HbmvArgs, hbmv_arg_check, hbmv_launcher, hbmv_template};
