//! Execution handle and configuration
//!
//! A [`Handle`] is the context every operation runs in. It owns the runtime
//! client that launches kernels, the [`HandleConfig`] that decides which
//! logging layers and numerics checks are active, and the state of the device
//! memory size query.
//!
//! # Device Memory Size Query
//!
//! ```text
//! handle.start_device_memory_size_query()?;
//! unsafe { handle.asum(n, x, 1, result)? }; // records its workspace, computes nothing
//! let bytes = handle.stop_device_memory_size_query()?;
//! ```
//!
//! While a query is active, operations record the workspace they would need
//! and return without validating, logging or touching any operand.
//!
//! # Environment
//!
//! [`HandleConfig::from_env`] reads:
//!
//! | Variable                   | Meaning                                            |
//! |----------------------------|----------------------------------------------------|
//! | `BANDR_LAYER`              | bitmask: 1 trace, 2 bench, 4 profile               |
//! | `BANDR_CHECK_NUMERICS`     | bitmask: 1 info, 2 warn, 4 fail, 8 only NaN/Inf    |
//! | `BANDR_DEVICE_MEMORY_SIZE` | workspace pool size in bytes (unset: unlimited)    |

use crate::error::{Error, Result};
use crate::runtime::{Allocator, DevicePtr, Runtime, RuntimeClient};
use bytemuck::Pod;
use parking_lot::Mutex;
use std::fmt;

/// Environment variable holding the [`LayerMode`] bitmask
pub const LAYER_ENV: &str = "BANDR_LAYER";
/// Environment variable holding the [`CheckNumericsMode`] bitmask
pub const CHECK_NUMERICS_ENV: &str = "BANDR_CHECK_NUMERICS";
/// Environment variable holding the workspace limit in bytes
pub const DEVICE_MEMORY_SIZE_ENV: &str = "BANDR_DEVICE_MEMORY_SIZE";

/// Which logging layers are active
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerMode {
    /// One comma-separated line per call with every argument
    pub trace: bool,
    /// One replayable `bandr-bench` command line per call
    pub bench: bool,
    /// One `{ key: value }` record per call with the problem shape
    pub profile: bool,
}

impl LayerMode {
    /// Decode a bitmask (1 trace, 2 bench, 4 profile)
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            trace: bits & 1 != 0,
            bench: bits & 2 != 0,
            profile: bits & 4 != 0,
        }
    }

    /// Encode as a bitmask
    pub const fn bits(self) -> u32 {
        self.trace as u32 | (self.bench as u32) << 1 | (self.profile as u32) << 2
    }

    /// True if any layer is active
    pub const fn any(self) -> bool {
        self.trace || self.bench || self.profile
    }
}

/// Which numerics checks run on operation inputs and outputs
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckNumericsMode {
    /// Log a summary of every scan
    pub info: bool,
    /// Log a warning when a scan finds abnormal values
    pub warn: bool,
    /// Fail the operation when a scan finds abnormal values
    pub fail: bool,
    /// Only NaN and Inf are abnormal (zeros and denormals are not)
    pub only_nan_inf: bool,
}

impl CheckNumericsMode {
    /// Decode a bitmask (1 info, 2 warn, 4 fail, 8 only NaN/Inf)
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            info: bits & 1 != 0,
            warn: bits & 2 != 0,
            fail: bits & 4 != 0,
            only_nan_inf: bits & 8 != 0,
        }
    }

    /// Encode as a bitmask
    pub const fn bits(self) -> u32 {
        self.info as u32
            | (self.warn as u32) << 1
            | (self.fail as u32) << 2
            | (self.only_nan_inf as u32) << 3
    }

    /// True if scans run at all
    pub const fn is_enabled(self) -> bool {
        self.info || self.warn || self.fail
    }
}

/// Explicit per-handle configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleConfig {
    /// Active logging layers
    pub layer_mode: LayerMode,
    /// Active numerics checks
    pub check_numerics: CheckNumericsMode,
    /// Upper bound on workspace bytes in use at once (`None`: unlimited)
    pub workspace_limit: Option<usize>,
}

impl HandleConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup` (variable name to value)
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(name: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(target: "bandr", variable = name, %value, "ignoring unparseable setting");
                    None
                }
            }
        }

        Self {
            layer_mode: LayerMode::from_bits(parse(LAYER_ENV, lookup(LAYER_ENV)).unwrap_or(0)),
            check_numerics: CheckNumericsMode::from_bits(
                parse(CHECK_NUMERICS_ENV, lookup(CHECK_NUMERICS_ENV)).unwrap_or(0),
            ),
            workspace_limit: parse(DEVICE_MEMORY_SIZE_ENV, lookup(DEVICE_MEMORY_SIZE_ENV)),
        }
    }

    /// Set the logging layers
    pub fn with_layer_mode(mut self, layer_mode: LayerMode) -> Self {
        self.layer_mode = layer_mode;
        self
    }

    /// Set the numerics checks
    pub fn with_check_numerics(mut self, check_numerics: CheckNumericsMode) -> Self {
        self.check_numerics = check_numerics;
        self
    }

    /// Bound the workspace pool
    pub fn with_workspace_limit(mut self, bytes: usize) -> Self {
        self.workspace_limit = Some(bytes);
        self
    }
}

#[derive(Debug, Default)]
struct SizeQuery {
    active: bool,
    size: usize,
}

/// Execution context for bandr operations
pub struct Handle<R: Runtime> {
    client: R::Client,
    config: HandleConfig,
    size_query: Mutex<SizeQuery>,
}

impl<R: Runtime> Handle<R> {
    /// Handle on the runtime's default device
    pub fn new(config: HandleConfig) -> Self {
        let device = R::default_device();
        Self::with_client(R::default_client(&device), config)
    }

    /// Handle on an existing client
    pub fn with_client(client: R::Client, config: HandleConfig) -> Self {
        Self {
            client,
            config,
            size_query: Mutex::new(SizeQuery::default()),
        }
    }

    /// The runtime client kernels are launched on
    pub fn client(&self) -> &R::Client {
        &self.client
    }

    /// The device of the client
    pub fn device(&self) -> &R::Device {
        self.client.device()
    }

    /// Current configuration
    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: HandleConfig) {
        self.config = config;
    }

    /// Enter device memory size query mode
    pub fn start_device_memory_size_query(&self) -> Result<()> {
        let mut query = self.size_query.lock();
        if query.active {
            return Err(Error::SizeQueryMismatch);
        }
        *query = SizeQuery {
            active: true,
            size: 0,
        };
        Ok(())
    }

    /// Leave size query mode, returning the largest workspace recorded
    pub fn stop_device_memory_size_query(&self) -> Result<usize> {
        let mut query = self.size_query.lock();
        if !query.active {
            return Err(Error::SizeQueryMismatch);
        }
        query.active = false;
        Ok(std::mem::take(&mut query.size))
    }

    /// True while a size query is active
    pub fn is_device_memory_size_query(&self) -> bool {
        self.size_query.lock().active
    }

    /// Record a workspace requirement during a size query
    pub(crate) fn set_optimal_device_memory_size(&self, bytes: usize) {
        let mut query = self.size_query.lock();
        query.size = query.size.max(bytes);
    }

    /// Acquire `size_bytes` of transient workspace
    ///
    /// Fails with `MemoryError` if the request would push the workspace in use
    /// past the configured limit, or if the device is out of memory.
    pub fn device_malloc(&self, size_bytes: usize) -> Result<Workspace<R>> {
        let allocator = self.client.allocator().clone();
        if let Some(limit) = self.config.workspace_limit {
            if allocator.allocated_bytes() + size_bytes > limit {
                return Err(Error::MemoryError { size: size_bytes });
            }
        }
        let ptr = allocator.allocate(size_bytes)?;
        Ok(Workspace {
            ptr,
            size: size_bytes,
            device: self.device().clone(),
            allocator,
        })
    }

    /// Workspace bytes currently held by operations on this handle
    pub fn workspace_in_use(&self) -> usize {
        self.client.allocator().allocated_bytes()
    }
}

impl<R: Runtime> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("runtime", &R::name())
            .field("config", &self.config)
            .field("size_query", &*self.size_query.lock())
            .finish()
    }
}

/// Transient device memory owned by one call, released on drop
pub struct Workspace<R: Runtime> {
    ptr: u64,
    size: usize,
    device: R::Device,
    allocator: R::Allocator,
}

impl<R: Runtime> Workspace<R> {
    /// Typed address of the start of the workspace
    pub fn ptr<T>(&self) -> DevicePtr<T> {
        DevicePtr::from_addr(self.ptr)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Copy `len` elements starting `offset` elements in back to the host
    pub fn read<T: Pod>(&self, offset: usize, len: usize) -> Result<Vec<T>> {
        let elem = std::mem::size_of::<T>();
        if (offset + len) * elem > self.size {
            return Err(Error::invalid_value(
                "len",
                format!("read of {len} elements at {offset} exceeds workspace of {} bytes", self.size),
            ));
        }
        let mut out = vec![T::zeroed(); len];
        let src = self.ptr + (offset * elem) as u64;
        R::copy_from_device(src, bytemuck::cast_slice_mut(&mut out), &self.device)?;
        Ok(out)
    }
}

impl<R: Runtime> Drop for Workspace<R> {
    fn drop(&mut self) {
        self.allocator.deallocate(self.ptr, self.size);
    }
}

impl<R: Runtime> fmt::Debug for Workspace<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("ptr", &format_args!("0x{:x}", self.ptr))
            .field("size", &self.size)
            .finish()
    }
}
