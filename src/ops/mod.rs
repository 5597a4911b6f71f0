//! Public operations
//!
//! Operations are defined as traits over a runtime and implemented by
//! [`Handle`](crate::handle::Handle), which gives every call access to the
//! client, the configuration and the workspace pool.
//!
//! ```text
//! Handle<R>
//!   ├── implements Level1Ops<R>
//!   │     └── asum, asum_batched, asum_strided_batched
//!   └── implements BandedOps<R>
//!         ├── gbmv, gbmv_batched, gbmv_strided_batched
//!         └── hbmv, hbmv_batched, hbmv_strided_batched
//! ```
//!
//! Every method is generic over the element type. Single calls take plain
//! device addresses, `*_batched` calls take device arrays of addresses and
//! `*_strided_batched` calls take a base address plus a stride per operand.
//!
//! A panic raised while a call executes is reported as
//! [`Error::Internal`](crate::error::Error::Internal) instead of unwinding
//! into the caller.

mod handle;
mod traits;

pub use traits::{BandedOps, Level1Ops};
