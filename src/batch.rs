//! Batch operands, scalars and result arguments
//!
//! Every operation accepts its operands in one calling convention, whatever
//! the instance family:
//!
//! ```text
//! single            Strided { base, stride: 0 }      batch_count = 1
//! strided batched   Strided { base, stride }         instance b at base + b*stride
//! batched           PointerArray(ptrs)               instance b at ptrs[b]
//! ```
//!
//! Kernels resolve the operand of their batch instance with
//! [`BatchOperand::load`], adding the traversal shift computed by the launcher.

use crate::dtype::{Element, RealElement};
use crate::runtime::DevicePtr;
use std::fmt;

/// One operand across all instances of a batch
#[derive(Debug, PartialEq, Eq)]
pub enum BatchOperand<T> {
    /// Instances at a fixed element stride from a single base address
    Strided {
        /// Address of instance 0
        base: DevicePtr<T>,
        /// Elements between consecutive instances
        stride: i64,
    },
    /// Device array holding one address per instance
    PointerArray(DevicePtr<DevicePtr<T>>),
}

impl<T> Clone for BatchOperand<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BatchOperand<T> {}

impl<T: 'static> BatchOperand<T> {
    /// A single instance
    pub fn single(base: DevicePtr<T>) -> Self {
        Self::Strided { base, stride: 0 }
    }

    /// Instances `stride` elements apart
    pub fn strided(base: DevicePtr<T>, stride: i64) -> Self {
        Self::Strided { base, stride }
    }

    /// Instances listed in a device pointer array
    pub fn pointer_array(ptrs: DevicePtr<DevicePtr<T>>) -> Self {
        Self::PointerArray(ptrs)
    }

    /// True if the base address (or the pointer array itself) is null
    pub fn is_null(&self) -> bool {
        match self {
            Self::Strided { base, .. } => base.is_null(),
            Self::PointerArray(ptrs) => ptrs.is_null(),
        }
    }

    /// Element stride between instances (0 for pointer arrays)
    pub fn stride(&self) -> i64 {
        match self {
            Self::Strided { stride, .. } => *stride,
            Self::PointerArray(_) => 0,
        }
    }

    /// Address of instance `batch`, shifted by `shift` elements
    ///
    /// # Safety
    ///
    /// For pointer arrays, `batch` must index a live element of the array.
    #[inline]
    pub unsafe fn load(&self, batch: usize, shift: i64) -> DevicePtr<T> {
        match *self {
            Self::Strided { base, stride } => base.offset(shift + batch as i64 * stride),
            Self::PointerArray(ptrs) => unsafe { ptrs.read(batch as i64) }.offset(shift),
        }
    }

    /// [`load`](Self::load) when `cond` holds, the null address otherwise
    ///
    /// # Safety
    ///
    /// Same as [`load`](Self::load) when `cond` holds.
    #[inline]
    pub unsafe fn cond_load(&self, cond: bool, batch: usize, shift: i64) -> DevicePtr<T> {
        if cond {
            unsafe { self.load(batch, shift) }
        } else {
            DevicePtr::null()
        }
    }
}

impl<T> fmt::Display for BatchOperand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strided { base, .. } => write!(f, "{base}"),
            Self::PointerArray(ptrs) => write!(f, "{ptrs}"),
        }
    }
}

/// A scalar multiplier and where it lives
///
/// Host scalars are known before launch, which enables the `alpha == 0,
/// beta == 1` short circuit. Device scalars are read by the kernel; every
/// batch instance reads the same value.
#[derive(Debug, PartialEq)]
pub enum Scalar<T> {
    /// Value held on the host
    Host(T),
    /// Address of the value in device memory
    Device(DevicePtr<T>),
}

impl<T: Clone> Clone for Scalar<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Host(v) => Self::Host(v.clone()),
            Self::Device(p) => Self::Device(*p),
        }
    }
}

impl<T: Copy> Copy for Scalar<T> {}

impl<T: Element> Scalar<T> {
    /// True for device-resident scalars
    #[inline]
    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }

    /// The value, if host-resident
    #[inline]
    pub fn host_value(&self) -> Option<T> {
        match self {
            Self::Host(v) => Some(*v),
            Self::Device(_) => None,
        }
    }

    /// True for a null device address
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Device(p) if p.is_null())
    }

    /// Resolve the value inside a kernel
    ///
    /// # Safety
    ///
    /// A device scalar must point to a live `T`.
    #[inline]
    pub unsafe fn load(&self) -> T {
        match *self {
            Self::Host(v) => v,
            Self::Device(p) => unsafe { p.read(0) },
        }
    }
}

impl<T: Element> fmt::Display for Scalar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(v) => write!(f, "{v}"),
            Self::Device(p) => write!(f, "{p}"),
        }
    }
}

/// Destination of a reduction: one real value per batch instance
#[derive(Debug)]
pub enum ResultArg<'a, R: RealElement> {
    /// Host slice with at least `batch_count` elements
    Host(&'a mut [R]),
    /// Device array with at least `batch_count` elements
    Device(DevicePtr<R>),
}

impl<R: RealElement> ResultArg<'_, R> {
    /// True for device-resident results
    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

/// A vector operand: storage, offset of element 0 and increment
#[derive(Debug, PartialEq, Eq)]
pub struct VectorArg<T> {
    /// Storage of every batch instance
    pub data: BatchOperand<T>,
    /// Element offset applied to every instance
    pub offset: i64,
    /// Increment between logical elements (may be negative)
    pub inc: i64,
}

impl<T> Clone for VectorArg<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorArg<T> {}

impl<T: 'static> VectorArg<T> {
    /// A single vector
    pub fn new(data: DevicePtr<T>, inc: i64) -> Self {
        Self {
            data: BatchOperand::single(data),
            offset: 0,
            inc,
        }
    }

    /// Vectors `stride` elements apart
    pub fn strided(base: DevicePtr<T>, inc: i64, stride: i64) -> Self {
        Self {
            data: BatchOperand::strided(base, stride),
            offset: 0,
            inc,
        }
    }

    /// Vectors listed in a device pointer array
    pub fn batched(ptrs: DevicePtr<DevicePtr<T>>, inc: i64) -> Self {
        Self {
            data: BatchOperand::pointer_array(ptrs),
            offset: 0,
            inc,
        }
    }

    /// Start every instance `offset` elements into its storage
    pub fn with_offset(self, offset: i64) -> Self {
        Self { offset, ..self }
    }
}

/// A compact band matrix operand
#[derive(Debug, PartialEq, Eq)]
pub struct BandMatrixArg<T> {
    /// Storage of every batch instance
    pub data: BatchOperand<T>,
    /// Element offset applied to every instance
    pub offset: i64,
    /// Leading dimension of the compact buffer
    pub lda: usize,
}

impl<T> Clone for BandMatrixArg<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BandMatrixArg<T> {}

impl<T: 'static> BandMatrixArg<T> {
    /// A single matrix
    pub fn new(data: DevicePtr<T>, lda: usize) -> Self {
        Self {
            data: BatchOperand::single(data),
            offset: 0,
            lda,
        }
    }

    /// Matrices `stride` elements apart
    pub fn strided(base: DevicePtr<T>, lda: usize, stride: i64) -> Self {
        Self {
            data: BatchOperand::strided(base, stride),
            offset: 0,
            lda,
        }
    }

    /// Matrices listed in a device pointer array
    pub fn batched(ptrs: DevicePtr<DevicePtr<T>>, lda: usize) -> Self {
        Self {
            data: BatchOperand::pointer_array(ptrs),
            offset: 0,
            lda,
        }
    }

    /// Start every instance `offset` elements into its storage
    pub fn with_offset(self, offset: i64) -> Self {
        Self { offset, ..self }
    }
}
