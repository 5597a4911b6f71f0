//! Sum of magnitudes
//!
//! `result[b] = sum_i |re(x_i)| + |im(x_i)|` over the `n` elements of each
//! batch instance. The reduction runs in two launches through a handle
//! workspace of [`reduction_workspace_size`] bytes:
//!
//! ```text
//! workspace: [ partials: blocks * batch_count | results: batch_count ]
//! ```
//!
//! Device results are written in place by the second launch; host results
//! are written to the workspace tail and copied back.

use crate::batch::{ResultArg, VectorArg};
use crate::dtype::Element;
use crate::error::{ArgCheck, Error, Result};
use crate::handle::Handle;
use crate::kernels::reduction::{
    AsumFinalizeKernel, AsumPartialKernel, NB, reduction_blocks, reduction_workspace_size,
};
use crate::logging::{BatchFamily, CallLog};
use crate::numerics::check_numerics_vector;
use crate::runtime::{DevicePtr, Dim3, LaunchGeometry, Runtime, RuntimeClient};

/// Validate asum arguments
///
/// When there is nothing to sum (`n == 0`, `incx <= 0` or no instances) the
/// results are set to zero here and `QuickReturn` is returned; `x` may then
/// be null.
pub fn asum_arg_check<R: Runtime, T: Element>(
    device: &R::Device,
    n: usize,
    x: &VectorArg<T>,
    batch_count: usize,
    result: &mut ResultArg<'_, T::Real>,
) -> Result<ArgCheck> {
    match result {
        ResultArg::Device(p) if p.is_null() => return Err(Error::invalid_pointer("result")),
        ResultArg::Host(slice) if slice.len() < batch_count => {
            return Err(Error::invalid_value(
                "result",
                format!("{} slots for {batch_count} instances", slice.len()),
            ));
        }
        _ => {}
    }
    if batch_count > u32::MAX as usize {
        return Err(Error::invalid_value(
            "batch_count",
            format!("{batch_count} exceeds the grid limit"),
        ));
    }

    if n == 0 || x.inc <= 0 || batch_count == 0 {
        let zero = <T::Real as Element>::zero();
        match result {
            ResultArg::Host(slice) => slice[..batch_count].fill(zero),
            ResultArg::Device(p) => {
                let zeros = vec![zero; batch_count];
                R::copy_to_device(bytemuck::cast_slice(&zeros), p.addr(), device)?;
            }
        }
        return Ok(ArgCheck::QuickReturn);
    }

    if x.data.is_null() {
        return Err(Error::invalid_pointer("x"));
    }
    Ok(ArgCheck::Continue)
}

/// Run both reduction stages
///
/// `workspace` must hold [`reduction_workspace_size`] bytes for `n` and
/// `batch_count`; arguments must have passed [`asum_arg_check`].
pub fn asum_launcher<R: Runtime, T: Element>(
    client: &R::Client,
    n: usize,
    x: &VectorArg<T>,
    batch_count: usize,
    workspace: DevicePtr<T::Real>,
    result: ResultArg<'_, T::Real>,
) -> Result<()> {
    let blocks = reduction_blocks(n);
    if blocks == 0 || batch_count == 0 {
        return Ok(());
    }

    let partial = AsumPartialKernel {
        n,
        x: x.data,
        shift_x: x.offset,
        incx: x.inc,
        partials: workspace,
        blocks,
    };
    let block = Dim3::xy(NB, 1);
    tracing::debug!(target: "bandr", n, blocks, batch_count, "launching asum");
    client.launch(
        LaunchGeometry::new(Dim3::xy(blocks as u32, batch_count as u32), block),
        &partial,
    )?;

    let result_ptr = match &result {
        ResultArg::Device(p) => *p,
        ResultArg::Host(_) => workspace.offset((blocks * batch_count) as i64),
    };
    let finalize = AsumFinalizeKernel {
        partials: workspace,
        blocks,
        result: result_ptr,
    };
    client.launch(
        LaunchGeometry::new(Dim3::xy(1, batch_count as u32), block),
        &finalize,
    )?;

    if let ResultArg::Host(slice) = result {
        R::copy_from_device(
            result_ptr.addr(),
            bytemuck::cast_slice_mut(&mut slice[..batch_count]),
            client.device(),
        )?;
    }
    Ok(())
}

/// Full asum call on `handle`
pub fn asum_template<R: Runtime, T: Element>(
    handle: &Handle<R>,
    family: BatchFamily,
    n: usize,
    x: &VectorArg<T>,
    batch_count: usize,
    mut result: ResultArg<'_, T::Real>,
) -> Result<()> {
    let workspace_bytes = reduction_workspace_size::<T::Real>(n, batch_count);
    if handle.is_device_memory_size_query() {
        if n > 0 && x.inc > 0 && batch_count > 0 {
            handle.set_optimal_device_memory_size(workspace_bytes);
        }
        return Ok(());
    }

    let config = handle.config().clone();
    let log = log_call(family, n, x, batch_count);
    if config.layer_mode.any() {
        log.emit(config.layer_mode);
    }

    if asum_arg_check::<R, T>(handle.device(), n, x, batch_count, &mut result)?
        == ArgCheck::QuickReturn
    {
        return Ok(());
    }

    let workspace = handle.device_malloc(workspace_bytes)?;

    let mode = config.check_numerics;
    if mode.is_enabled() {
        check_numerics_vector(handle, log.function(), n, x, batch_count, mode, true)?;
    }

    asum_launcher::<R, T>(handle.client(), n, x, batch_count, workspace.ptr(), result)
}

fn log_call<T: Element>(family: BatchFamily, n: usize, x: &VectorArg<T>, batch_count: usize) -> CallLog {
    let mut log = CallLog::new(T::DTYPE, "asum", family)
        .arg("-n", "N", n)
        .ptr(x.data)
        .arg("--incx", "incx", x.inc);
    if family == BatchFamily::StridedBatched {
        log = log.arg("--stride_x", "stride_x", x.data.stride());
    }
    if family != BatchFamily::Single {
        log = log.arg("--batch_count", "batch_count", batch_count);
    }
    log
}
