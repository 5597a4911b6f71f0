//! Hermitian band matrix-vector product
//!
//! `y = alpha * A * x + beta * y` with `A` an `n x n` Hermitian band matrix
//! holding `k` off-diagonals on each side, of which one triangle is stored
//! (see [`crate::band::HermitianBandLayout`]). Complex element types only.

use super::gbmv::{check_scalars, check_storage_extent};
use crate::band::Fill;
use crate::batch::{BandMatrixArg, Scalar, VectorArg};
use crate::dtype::ComplexElement;
use crate::error::{ArgCheck, Error, Result};
use crate::handle::Handle;
use crate::kernels::common::{DIM_X, DIM_Y, tiles_for};
use crate::kernels::hbmv::HbmvKernel;
use crate::logging::{BatchFamily, CallLog};
use crate::numerics::check_numerics_vector;
use crate::runtime::{Dim3, LaunchGeometry, Runtime, RuntimeClient};
use crate::traversal::VectorTraversal;

/// All arguments of one hbmv call
#[derive(Clone, Copy, Debug)]
pub struct HbmvArgs<T> {
    /// Stored triangle
    pub fill: Fill,
    /// Order of `A`
    pub n: usize,
    /// Off-diagonals
    pub k: usize,
    /// Scalar on `A x`
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

/// Validate hbmv arguments without touching device memory
pub fn hbmv_arg_check<T: ComplexElement>(args: &HbmvArgs<T>) -> Result<ArgCheck> {
    // Diagonals 0..=2k are walked per row
    if args.k.checked_mul(2).is_none_or(|d| d >= i64::MAX as usize) {
        return Err(Error::invalid_value(
            "k",
            format!("k {} overflows the band size", args.k),
        ));
    }
    if args.a.lda < args.k + 1 {
        return Err(Error::invalid_value(
            "lda",
            format!("lda {} is smaller than k + 1 = {}", args.a.lda, args.k + 1),
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

    if args.n == 0 || args.batch_count == 0 {
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

/// Launch the hbmv kernel over every batch instance
pub fn hbmv_launcher<R: Runtime, T: ComplexElement>(
    client: &R::Client,
    args: &HbmvArgs<T>,
) -> Result<()> {
    if args.n == 0 || args.batch_count == 0 {
        return Ok(());
    }
    if let (Some(alpha), Some(beta)) = (args.alpha.host_value(), args.beta.host_value()) {
        if alpha.is_zero() && beta == T::one() {
            return Ok(());
        }
    }

    let x_trav = VectorTraversal::new(args.x.offset, args.x.inc, args.n);
    let y_trav = VectorTraversal::new(args.y.offset, args.y.inc, args.n);
    let geometry = LaunchGeometry::new(
        Dim3::xy(tiles_for(args.n), args.batch_count as u32),
        Dim3::xy(DIM_X, DIM_Y),
    );

    let kernel = HbmvKernel {
        fill: args.fill,
        n: args.n,
        k: args.k,
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

    tracing::debug!(target: "bandr", fill = %args.fill, grid = ?geometry.grid, "launching hbmv");
    client.launch(geometry, &kernel)
}

/// Full hbmv call on `handle`
pub fn hbmv_template<R: Runtime, T: ComplexElement>(
    handle: &Handle<R>,
    family: BatchFamily,
    args: &HbmvArgs<T>,
) -> Result<()> {
    if handle.is_device_memory_size_query() {
        return Ok(());
    }

    let config = handle.config().clone();
    let log = log_call(family, args);
    if config.layer_mode.any() {
        log.emit(config.layer_mode);
    }

    if hbmv_arg_check(args)? == ArgCheck::QuickReturn {
        return Ok(());
    }

    let mode = config.check_numerics;
    if mode.is_enabled() {
        check_numerics_vector(handle, log.function(), args.n, &args.x, args.batch_count, mode, true)?;
    }

    hbmv_launcher::<R, T>(handle.client(), args)?;

    if mode.is_enabled() {
        check_numerics_vector(handle, log.function(), args.n, &args.y, args.batch_count, mode, false)?;
    }
    Ok(())
}

fn log_call<T: ComplexElement>(family: BatchFamily, args: &HbmvArgs<T>) -> CallLog {
    let strided = family == BatchFamily::StridedBatched;
    let mut log = CallLog::new(T::DTYPE, "hbmv", family)
        .arg("--uplo", "uplo", args.fill)
        .arg("-n", "N", args.n)
        .arg("-k", "K", args.k)
        .scalar("alpha", args.alpha)
        .ptr(args.a.data)
        .arg("--lda", "lda", args.a.lda);
    if strided {
        log = log.arg("--stride_a", "stride_a", args.a.data.stride());
    }
    log = log.ptr(args.x.data).arg("--incx", "incx", args.x.inc);
    if strided {
        log = log.arg("--stride_x", "stride_x", args.x.data.stride());
    }
    log = log
        .scalar("beta", args.beta)
        .ptr(args.y.data)
        .arg("--incy", "incy", args.y.inc);
    if strided {
        log = log.arg("--stride_y", "stride_y", args.y.data.stride());
    }
    if family != BatchFamily::Single {
        log = log.arg("--batch_count", "batch_count", args.batch_count);
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex64;
    use crate::runtime::DevicePtr;

    fn args() -> HbmvArgs<Complex64> {
        HbmvArgs {
            fill: Fill::Lower,
            n: 3,
            k: 1,
            alpha: Scalar::Host(Complex64::ONE),
            a: BandMatrixArg::new(DevicePtr::from_addr(0x100), 2),
            x: VectorArg::new(DevicePtr::from_addr(0x200), 1),
            beta: Scalar::Host(Complex64::ZERO),
            y: VectorArg::new(DevicePtr::from_addr(0x300), 1),
            batch_count: 1,
        }
    }

    #[test]
    fn test_arg_check_order() {
        let mut a = args();
        a.a.lda = 1;
        a.n = 0;
        assert!(matches!(hbmv_arg_check(&a), Err(Error::InvalidValue { arg: "lda", .. })));

        let mut a = args();
        a.n = 0;
        assert_eq!(hbmv_arg_check(&a), Ok(ArgCheck::QuickReturn));

        let mut a = args();
        a.x.data = crate::batch::BatchOperand::single(DevicePtr::null());
        assert_eq!(hbmv_arg_check(&a), Err(Error::invalid_pointer("x")));

        assert_eq!(hbmv_arg_check(&args()), Ok(ArgCheck::Continue));
    }

    #[test]
    fn test_band_size_overflow() {
        let mut a = args();
        a.k = usize::MAX;
        assert!(matches!(hbmv_arg_check(&a), Err(Error::InvalidValue { arg: "k", .. })));

        let mut a = args();
        a.k = usize::MAX / 2 + 1;
        a.a.lda = usize::MAX;
        assert!(matches!(hbmv_arg_check(&a), Err(Error::InvalidValue { arg: "k", .. })));

        let mut a = args();
        a.a.lda = usize::MAX / 2;
        assert!(matches!(hbmv_arg_check(&a), Err(Error::InvalidValue { arg: "lda", .. })));
    }

    #[test]
    fn test_profile_line() {
        let log = log_call(BatchFamily::Single, &args());
        assert_eq!(
            log.profile_line(),
            "{ function: chbmv, uplo: L, N: 3, K: 1, lda: 2, incx: 1, incy: 1 }"
        );
    }
}
