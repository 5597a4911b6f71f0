//! Numerics checks on operation inputs and outputs
//!
//! When a handle's [`CheckNumericsMode`] is enabled, operations scan their
//! vector operands before computing (inputs) and after (outputs). The scan
//! runs as a device kernel; the host folds the per-block flags and reports:
//!
//! - `info`: a summary event for every scan,
//! - `warn`: a warning when abnormal values are present,
//! - `fail`: `Error::CheckNumericsFail` when abnormal values are present.
//!
//! NaN, Inf, zero and denormal values are abnormal; with `only_nan_inf` only
//! NaN and Inf are.

use crate::batch::VectorArg;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::handle::{CheckNumericsMode, Handle};
use crate::kernels::numerics::{NumericFlags, NumericsScanKernel};
use crate::kernels::reduction::{NB, reduction_blocks};
use crate::runtime::{Dim3, LaunchGeometry, Runtime, RuntimeClient};
use crate::traversal::VectorTraversal;

/// True if `flags` contain a value that `mode` treats as abnormal
pub fn is_abnormal(flags: &NumericFlags, mode: CheckNumericsMode) -> bool {
    let nan_inf = flags.has_nan != 0 || flags.has_inf != 0;
    if mode.only_nan_inf {
        nan_inf
    } else {
        nan_inf || flags.has_zero != 0 || flags.has_denorm != 0
    }
}

/// Log the outcome of a scan and apply the fail policy
pub fn report_numerics(
    function: &str,
    flags: &NumericFlags,
    mode: CheckNumericsMode,
    is_input: bool,
) -> Result<()> {
    let abnormal = is_abnormal(flags, mode);
    let direction = if is_input { "input" } else { "output" };

    if mode.info {
        tracing::info!(
            target: "bandr::numerics",
            function,
            direction,
            has_nan = flags.has_nan != 0,
            has_inf = flags.has_inf != 0,
            has_zero = flags.has_zero != 0,
            has_denorm = flags.has_denorm != 0,
            "numerics scan"
        );
    }
    if mode.warn && abnormal {
        tracing::warn!(
            target: "bandr::numerics",
            function,
            direction,
            has_nan = flags.has_nan != 0,
            has_inf = flags.has_inf != 0,
            has_zero = flags.has_zero != 0,
            has_denorm = flags.has_denorm != 0,
            "abnormal values found"
        );
    }
    if mode.fail && abnormal {
        return Err(Error::CheckNumericsFail {
            function: function.to_string(),
            is_input,
        });
    }
    Ok(())
}

/// Scan `n` elements of every instance of `x`
///
/// Does nothing when the mode is disabled, the vector is empty or its storage
/// is null. The increment must be nonzero.
pub fn check_numerics_vector<R: Runtime, T: Element>(
    handle: &Handle<R>,
    function: &str,
    n: usize,
    x: &VectorArg<T>,
    batch_count: usize,
    mode: CheckNumericsMode,
    is_input: bool,
) -> Result<()> {
    if !mode.is_enabled() || n == 0 || batch_count == 0 || x.data.is_null() {
        return Ok(());
    }

    let traversal = VectorTraversal::new(x.offset, x.inc, n);
    let blocks = reduction_blocks(n);
    let records = blocks * batch_count;
    let workspace = handle.device_malloc(records * std::mem::size_of::<NumericFlags>())?;

    let kernel = NumericsScanKernel {
        n,
        x: x.data,
        shift_x: traversal.shift(),
        incx: traversal.inc(),
        flags: workspace.ptr(),
        blocks,
    };
    let geometry = LaunchGeometry::new(
        Dim3::xy(blocks as u32, batch_count as u32),
        Dim3::xy(NB, 1),
    );
    handle.client().launch(geometry, &kernel)?;

    let flags = workspace
        .read::<NumericFlags>(0, records)?
        .into_iter()
        .fold(NumericFlags::default(), NumericFlags::merge);
    report_numerics(function, &flags, mode, is_input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: NumericFlags = NumericFlags {
        has_nan: 1,
        has_inf: 0,
        has_zero: 0,
        has_denorm: 0,
    };
    const DENORM: NumericFlags = NumericFlags {
        has_nan: 0,
        has_inf: 0,
        has_zero: 0,
        has_denorm: 1,
    };

    #[test]
    fn test_only_nan_inf_ignores_denormals() {
        let fail = CheckNumericsMode::from_bits(4);
        let fail_nan_inf = CheckNumericsMode::from_bits(4 | 8);
        assert!(is_abnormal(&DENORM, fail));
        assert!(!is_abnormal(&DENORM, fail_nan_inf));
        assert!(is_abnormal(&NAN, fail_nan_inf));
    }

    #[test]
    fn test_fail_mode_reports_direction() {
        let err = report_numerics("sgbmv", &NAN, CheckNumericsMode::from_bits(4), false).unwrap_err();
        assert_eq!(
            err,
            Error::CheckNumericsFail {
                function: "sgbmv".to_string(),
                is_input: false
            }
        );
        assert!(report_numerics("sgbmv", &NAN, CheckNumericsMode::from_bits(2), true).is_ok());
    }
}
