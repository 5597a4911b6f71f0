//! General band matrix-vector product
//!
//! `y = alpha * op(A) * x + beta * y` for every batch instance, with `A` an
//! `m x n` band matrix in compact storage (see [`crate::band`]).
//!
//! The call pipeline is:
//!
//! ```text
//! gbmv_template
//! ├── size query short circuit (no workspace)
//! ├── CallLog::emit
//! ├── gbmv_arg_check           -> Continue | QuickReturn | Err
//! ├── gbmv_check_numerics      (input: x)
//! ├── gbmv_launcher            -> one launch over (tiles, batch_count)
//! └── gbmv_check_numerics      (output: y)
//! ```

use crate::band::Operation;
use crate::batch::{BandMatrixArg, Scalar, VectorArg};
use crate::dtype::Element;
use crate::error::{ArgCheck, Error, Result};
use crate::handle::{CheckNumericsMode, Handle};
use crate::kernels::common::tiles_for;
use crate::kernels::gbmv::GbmvKernel;
use crate::logging::{BatchFamily, CallLog};
use crate::numerics::check_numerics_vector;
use crate::runtime::{Dim3, LaunchGeometry, Runtime, RuntimeClient};
use crate::traversal::VectorTraversal;

/// All arguments of one gbmv call
#[derive(Clone, Copy, Debug)]
pub struct GbmvArgs<T> {
    /// Transpose mode of `A`
    pub trans: Operation,
    /// Logical rows of `A`
    pub m: usize,
    /// Logical columns of `A`
    pub n: usize,
    /// Sub-diagonals
    pub kl: usize,
    /// Super-diagonals
    pub ku: usize,
    /// Scalar on `op(A) x`
    pub alpha: Scalar<T>,
    /// Band matrix
    pub a: BandMatrixArg<T>,
    /// Input vector
    pub x: VectorArg<T>,
    /// Scalar on `y`
    pub beta: Scalar<T>,
    /// Output vector
    pub y: VectorArg<T>,
    /// Number of instances
    pub batch_count: usize,
}

impl<T: Element> GbmvArgs<T> {
    /// Length of `x` per instance
    pub fn x_len(&self) -> usize {
        self.trans.x_len(self.m, self.n)
    }

    /// Length of `y` per instance
    pub fn y_len(&self) -> usize {
        self.trans.y_len(self.m, self.n)
    }
}

/// Validate gbmv arguments without touching device memory
///
/// Host scalars are inspected to detect the `alpha == 0, beta == 1` no-op and
/// to decide whether `A` and `x` are needed. With device scalars `alpha` may
/// be nonzero, so every operand is required.
pub fn gbmv_arg_check<T: Element>(args: &GbmvArgs<T>) -> Result<ArgCheck> {
    let band_rows = args
        .kl
        .checked_add(args.ku)
        .and_then(|r| r.checked_add(1))
        .filter(|&r| r <= i64::MAX as usize)
        .ok_or_else(|| {
            Error::invalid_value(
                "ku",
                format!("kl {} + ku {} + 1 overflows the band size", args.kl, args.ku),
            )
        })?;
    if args.a.lda < band_rows {
        return Err(Error::invalid_value(
            "lda",
            format!("lda {} is smaller than kl + ku + 1 = {band_rows}", args.a.lda),
        ));
    }
    check_storage_extent(args.a.lda, args.n)?;
    if args.x.inc == 0 {
        return Err(Error::invalid_value("incx", "increment must be nonzero"));
    }
    if args.y.inc == 0 {
        return Err(Error::invalid_value("incy", "increment must be nonzero"));
    }
    if args.batch_count > u32::MAX as usize {
        return Err(Error::invalid_value(
            "batch_count",
            format!("{} exceeds the grid limit", args.batch_count),
        ));
    }

    if args.m == 0 || args.n == 0 || args.batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }

    check_scalars(&args.alpha, &args.beta)?;

    let alpha_may_be_nonzero = match (args.alpha.host_value(), args.beta.host_value()) {
        (Some(alpha), Some(beta)) => {
            if alpha.is_zero() && beta == T::one() {
                return Ok(ArgCheck::QuickReturn);
            }
            !alpha.is_zero()
        }
        _ => true,
    };

    if args.y.data.is_null() {
        return Err(Error::invalid_pointer("y"));
    }
    if alpha_may_be_nonzero {
        if args.a.data.is_null() {
            return Err(Error::invalid_pointer("A"));
        }
        if args.x.data.is_null() {
            return Err(Error::invalid_pointer("x"));
        }
    }

    Ok(ArgCheck::Continue)
}

/// The compact buffer of `lda x n` elements must be addressable
pub(crate) fn check_storage_extent(lda: usize, n: usize) -> Result<()> {
    match lda.checked_mul(n) {
        Some(len) if len <= i64::MAX as usize => Ok(()),
        _ => Err(Error::invalid_value(
            "lda",
            format!("lda {lda} x n {n} overflows the addressable range"),
        )),
    }
}

/// Scalars must share residency, and device scalars must be non-null
pub(crate) fn check_scalars<T: Element>(alpha: &Scalar<T>, beta: &Scalar<T>) -> Result<()> {
    if alpha.is_device() != beta.is_device() {
        return Err(Error::invalid_value(
            "beta",
            "alpha and beta must both be host or both be device scalars",
        ));
    }
    if alpha.is_null() {
        return Err(Error::invalid_pointer("alpha"));
    }
    if beta.is_null() {
        return Err(Error::invalid_pointer("beta"));
    }
    Ok(())
}

/// Launch the gbmv kernel over every batch instance
///
/// Arguments must have passed [`gbmv_arg_check`]. Returns without launching
/// when there is nothing to do.
pub fn gbmv_launcher<R: Runtime, T: Element>(client: &R::Client, args: &GbmvArgs<T>) -> Result<()> {
    if args.m == 0 || args.n == 0 || args.batch_count == 0 {
        return Ok(());
    }

    let x_trav = VectorTraversal::new(args.x.offset, args.x.inc, args.x_len());
    let y_trav = VectorTraversal::new(args.y.offset, args.y.inc, args.y_len());

    let tiles = tiles_for(args.y_len());
    let geometry = LaunchGeometry::new(
        Dim3::xy(tiles, args.batch_count as u32),
        GbmvKernel::<T>::block_dim(),
    );

    if let (Some(alpha), Some(beta)) = (args.alpha.host_value(), args.beta.host_value()) {
        if alpha.is_zero() && beta == T::one() {
            return Ok(());
        }
    }

    let kernel = GbmvKernel {
        trans: args.trans,
        m: args.m,
        n: args.n,
        kl: args.kl,
        ku: args.ku,
        alpha: args.alpha,
        a: args.a.data,
        shift_a: args.a.offset,
        lda: args.a.lda,
        x: args.x.data,
        shift_x: x_trav.shift(),
        incx: x_trav.inc(),
        beta: args.beta,
        y: args.y.data,
        shift_y: y_trav.shift(),
        incy: y_trav.inc(),
    };

    tracing::debug!(
        target: "bandr",
        trans = %args.trans,
        grid = ?geometry.grid,
        block = ?geometry.block,
        "launching gbmv"
    );
    client.launch(geometry, &kernel)
}

/// Scan `x` (input) or `y` (output) of a gbmv call
///
/// The band matrix itself is not scanned.
pub fn gbmv_check_numerics<R: Runtime, T: Element>(
    handle: &Handle<R>,
    function: &str,
    args: &GbmvArgs<T>,
    mode: CheckNumericsMode,
    is_input: bool,
) -> Result<()> {
    if is_input {
        check_numerics_vector(handle, function, args.x_len(), &args.x, args.batch_count, mode, true)
    } else {
        check_numerics_vector(handle, function, args.y_len(), &args.y, args.batch_count, mode, false)
    }
}

/// Full gbmv call on `handle`
pub fn gbmv_template<R: Runtime, T: Element>(
    handle: &Handle<R>,
    family: BatchFamily,
    args: &GbmvArgs<T>,
) -> Result<()> {
    if handle.is_device_memory_size_query() {
        return Ok(());
    }

    let config = handle.config().clone();
    let log = log_call(family, args);
    if config.layer_mode.any() {
        log.emit(config.layer_mode);
    }

    if gbmv_arg_check(args)? == ArgCheck::QuickReturn {
        return Ok(());
    }

    let mode = config.check_numerics;
    if mode.is_enabled() {
        gbmv_check_numerics(handle, log.function(), args, mode, true)?;
    }

    gbmv_launcher::<R, T>(handle.client(), args)?;

    if mode.is_enabled() {
        gbmv_check_numerics(handle, log.function(), args, mode, false)?;
    }
    Ok(())
}

fn log_call<T: Element>(family: BatchFamily, args: &GbmvArgs<T>) -> CallLog {
    let mut log = CallLog::new(T::DTYPE, "gbmv", family)
        .arg("--transposeA", "transA", args.trans)
        .arg("-m", "M", args.m)
        .arg("-n", "N", args.n)
        .arg("--kl", "kl", args.kl)
        .arg("--ku", "ku", args.ku)
        .scalar("alpha", args.alpha)
        .ptr(args.a.data)
        .arg("--lda", "lda", args.a.lda);
    if family == BatchFamily::StridedBatched {
        log = log.arg("--stride_a", "stride_a", args.a.data.stride());
    }
    log = log.ptr(args.x.data).arg("--incx", "incx", args.x.inc);
    if family == BatchFamily::StridedBatched {
        log = log.arg("--stride_x", "stride_x", args.x.data.stride());
    }
    log = log
        .scalar("beta", args.beta)
        .ptr(args.y.data)
        .arg("--incy", "incy", args.y.inc);
    if family == BatchFamily::StridedBatched {
        log = log.arg("--stride_y", "stride_y", args.y.data.stride());
    }
    if family != BatchFamily::Single {
        log = log.arg("--batch_count", "batch_count", args.batch_count);
    }
    log
}
