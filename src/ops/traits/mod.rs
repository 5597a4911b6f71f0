//! Operation traits.
//!
//! Implementations are in the `handle` module.

mod banded;
mod level1;

pub use banded::BandedOps;
pub use level1::Level1Ops;
