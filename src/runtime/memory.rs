//! Device addresses and owning device buffers
//!
//! Operations receive operands the way a device BLAS does: as raw device
//! addresses plus shape, offset and increment parameters. [`DevicePtr`] is that
//! address, typed by element. [`DeviceBuffer`] owns an allocation on a
//! runtime's device and hands out its `DevicePtr`.
//!
//! Pointer-array batches are simply device buffers of `DevicePtr<T>`:
//!
//! ```ignore
//! let a0 = DeviceBuffer::<CpuRuntime, f32>::from_slice(&band0, &device)?;
//! let a1 = DeviceBuffer::<CpuRuntime, f32>::from_slice(&band1, &device)?;
//! let a_array = DeviceBuffer::<CpuRuntime, _>::from_slice(&[a0.ptr(), a1.ptr()], &device)?;
//! ```

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::marker::PhantomData;

use super::Runtime;
use crate::error::Result;

/// Typed device address
///
/// A plain address: copying it does not copy or borrow the memory behind it.
/// Reading and writing through it is `unsafe` and only valid for addresses
/// inside a live allocation of the executing device.
#[repr(transparent)]
pub struct DevicePtr<T> {
    addr: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DevicePtr<T> {
    /// The null address
    pub const fn null() -> Self {
        Self {
            addr: 0,
            _marker: PhantomData,
        }
    }

    /// Wrap a raw device address
    pub const fn from_addr(addr: u64) -> Self {
        Self {
            addr,
            _marker: PhantomData,
        }
    }

    /// Raw device address
    #[inline]
    pub const fn addr(self) -> u64 {
        self.addr
    }

    /// True for the null address
    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    /// Address `count` elements away (may be negative)
    #[inline]
    pub fn offset(self, count: i64) -> Self {
        let bytes = count.wrapping_mul(std::mem::size_of::<T>() as i64);
        Self::from_addr(self.addr.wrapping_add_signed(bytes))
    }

    /// Read the element at `index`
    ///
    /// # Safety
    ///
    /// `self.offset(index)` must point to an initialized `T` inside a live
    /// allocation of the executing device.
    #[inline]
    pub unsafe fn read(self, index: i64) -> T {
        unsafe { std::ptr::read(self.offset(index).addr as *const T) }
    }

    /// Write `value` at `index`
    ///
    /// # Safety
    ///
    /// `self.offset(index)` must point inside a live allocation of the
    /// executing device that no other thread accesses concurrently.
    #[inline]
    pub unsafe fn write(self, index: i64, value: T) {
        unsafe { std::ptr::write(self.offset(index).addr as *mut T, value) }
    }

    /// Address of host memory, for devices that share the host address space
    #[cfg(test)]
    pub(crate) fn from_host(ptr: *const T) -> Self {
        Self::from_addr(ptr as u64)
    }
}

impl<T> Clone for DevicePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DevicePtr<T> {}

impl<T> PartialEq for DevicePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for DevicePtr<T> {}

impl<T> Default for DevicePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for DevicePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.addr)
    }
}

impl<T> fmt::Display for DevicePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.addr)
    }
}

// SAFETY: DevicePtr is #[repr(transparent)] over u64; every bit pattern is a
// valid (possibly dangling) address and the all-zero pattern is null.
unsafe impl<T: 'static> Zeroable for DevicePtr<T> {}
// SAFETY: see Zeroable above; no padding, no interior references.
unsafe impl<T: 'static> Pod for DevicePtr<T> {}

/// Owning allocation of `len` elements on a runtime's device
///
/// Freed on drop.
pub struct DeviceBuffer<R: Runtime, T: Pod> {
    ptr: u64,
    len: usize,
    device: R::Device,
    _marker: PhantomData<T>,
}

impl<R: Runtime, T: Pod> DeviceBuffer<R, T> {
    /// Allocate `len` zero-initialized elements
    pub fn zeroed(len: usize, device: &R::Device) -> Result<Self> {
        let bytes = len * std::mem::size_of::<T>();
        let ptr = R::allocate(bytes, device)?;
        Ok(Self {
            ptr,
            len,
            device: device.clone(),
            _marker: PhantomData,
        })
    }

    /// Allocate and fill with a copy of `data`
    pub fn from_slice(data: &[T], device: &R::Device) -> Result<Self> {
        let buffer = Self::zeroed(data.len(), device)?;
        R::copy_to_device(bytemuck::cast_slice(data), buffer.ptr, device)?;
        Ok(buffer)
    }

    /// Overwrite the whole buffer with `data`
    ///
    /// `data` must have exactly `len()` elements.
    pub fn copy_from_slice(&mut self, data: &[T]) -> Result<()> {
        if data.len() != self.len {
            return Err(crate::error::Error::invalid_value(
                "data",
                format!("expected {} elements, got {}", self.len, data.len()),
            ));
        }
        R::copy_to_device(bytemuck::cast_slice(data), self.ptr, &self.device)
    }

    /// Copy the buffer back to the host
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut out = vec![T::zeroed(); self.len];
        R::copy_from_device(self.ptr, bytemuck::cast_slice_mut(&mut out), &self.device)?;
        Ok(out)
    }

    /// Device address of the first element
    #[inline]
    pub fn ptr(&self) -> DevicePtr<T> {
        DevicePtr::from_addr(self.ptr)
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    /// The device holding this buffer
    pub fn device(&self) -> &R::Device {
        &self.device
    }
}

impl<R: Runtime, T: Pod> Drop for DeviceBuffer<R, T> {
    fn drop(&mut self) {
        R::deallocate(self.ptr, self.size_in_bytes(), &self.device);
    }
}

impl<R: Runtime, T: Pod> fmt::Debug for DeviceBuffer<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("runtime", &R::name())
            .field("ptr", &format_args!("0x{:x}", self.ptr))
            .field("len", &self.len)
            .finish()
    }
}
