//! Operation implementations on [`Handle`](crate::handle::Handle)

mod banded;
mod level1;
