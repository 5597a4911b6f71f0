//! Data type system for bandr operands
//!
//! This module provides the `DType` enum naming the four supported element
//! kinds, and the `Element` trait that maps Rust types onto them.

pub mod complex;
mod element;

pub use complex::{Complex64, Complex128};
pub use element::{ComplexElement, Element, RealElement};

use std::fmt;

/// Element types supported by bandr operations
///
/// Every public entry point is generic over [`Element`]; `DType` is the
/// runtime name of that type, used for logging and function naming.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 32-bit floating point
    F32 = 1,
    /// 64-bit floating point
    F64 = 0,
    /// 64-bit complex (two f32: re, im)
    Complex64 = 40,
    /// 128-bit complex (two f64: re, im)
    Complex128 = 41,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Complex128 => 16,
            Self::F64 | Self::Complex64 => 8,
            Self::F32 => 4,
        }
    }

    /// Returns true if this is a complex number type
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// Returns the dtype of the real component (itself for real types)
    #[inline]
    pub const fn real_dtype(self) -> Self {
        match self {
            Self::F32 | Self::Complex64 => Self::F32,
            Self::F64 | Self::Complex128 => Self::F64,
        }
    }

    /// Short name for display (e.g., "f32", "c64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::Complex64 => "c64",
            Self::Complex128 => "c128",
        }
    }

    /// Precision string used on bench command lines (`-r f32_r`)
    pub const fn precision_str(self) -> &'static str {
        match self {
            Self::F32 => "f32_r",
            Self::F64 => "f64_r",
            Self::Complex64 => "f32_c",
            Self::Complex128 => "f64_c",
        }
    }

    /// BLAS routine prefix letter (`s`, `d`, `c`, `z`)
    pub const fn blas_prefix(self) -> &'static str {
        match self {
            Self::F32 => "s",
            Self::F64 => "d",
            Self::Complex64 => "c",
            Self::Complex128 => "z",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
