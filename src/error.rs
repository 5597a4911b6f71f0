//! Error types for bandr

use thiserror::Error;

/// Result type alias using bandr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bandr operations
///
/// Every variant except [`Error::Internal`] is produced before a kernel is
/// launched, so an operation that returns one of them has not written to any
/// output buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required buffer argument is null
    #[error("Invalid pointer: argument '{arg}' is null")]
    InvalidPointer {
        /// The argument name
        arg: &'static str,
    },

    /// Inconsistent or out-of-range argument
    #[error("Invalid value for '{arg}': {reason}")]
    InvalidValue {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Transient workspace could not be acquired
    #[error("Memory error: failed to acquire {size} bytes of workspace")]
    MemoryError {
        /// Requested size in bytes
        size: usize,
    },

    /// A device memory size query was started twice or stopped without
    /// being started
    #[error("Device memory size query start/stop mismatch")]
    SizeQueryMismatch,

    /// The numerics scan found NaN or Inf values while in fail mode
    #[error("Numerics check failed in '{function}' ({})", if *is_input { "input" } else { "output" })]
    CheckNumericsFail {
        /// Name of the operation whose operands were scanned
        function: String,
        /// Whether the scanned operand was an input
        is_input: bool,
    },

    /// Platform-level execution fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid value error
    pub fn invalid_value(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(arg: &'static str) -> Self {
        Self::InvalidPointer { arg }
    }

    /// Stable short name of the error class, as used in logs
    pub fn status_name(&self) -> &'static str {
        match self {
            Self::InvalidPointer { .. } => "invalid_pointer",
            Self::InvalidValue { .. } => "invalid_value",
            Self::MemoryError { .. } => "memory_error",
            Self::SizeQueryMismatch => "size_query_mismatch",
            Self::CheckNumericsFail { .. } => "check_numerics_fail",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Outcome of argument validation that is not an error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgCheck {
    /// Arguments are valid and there is work to do
    Continue,
    /// Arguments are valid and the call has nothing to do
    QuickReturn,
}

/// Run the body of a public entry point, converting a panic raised by a
/// kernel or collaborator into [`Error::Internal`].
pub(crate) fn catch_internal<T>(function: &str, body: impl FnOnce() -> Result<T>) -> Result<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(target: "bandr", function, %reason, "execution fault");
            Err(Error::Internal(format!("{function}: {reason}")))
        }
    }
}
