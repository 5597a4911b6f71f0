//! Level-1 operations: vector reductions
//!
//! The public entry points are [`crate::ops::Level1Ops`] on a handle.

pub mod asum;

pub use asum::{asum_arg_check, asum_launcher, asum_template};
