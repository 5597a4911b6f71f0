//! BandedOps implementation for Handle.

use crate::band::{Fill, Operation};
use crate::batch::{BandMatrixArg, Scalar, VectorArg};
use crate::blas2::{GbmvArgs, HbmvArgs, gbmv_template, hbmv_template};
use crate::dtype::{ComplexElement, Element};
use crate::error::{Result, catch_internal};
use crate::handle::Handle;
use crate::logging::{BatchFamily, routine_name};
use crate::ops::BandedOps;
use crate::runtime::{DevicePtr, Runtime};

fn run_gbmv<R: Runtime, T: Element>(
    handle: &Handle<R>,
    family: BatchFamily,
    args: GbmvArgs<T>,
) -> Result<()> {
    catch_internal(&routine_name(T::DTYPE, "gbmv", family), || {
        gbmv_template(handle, family, &args)
    })
}

fn run_hbmv<R: Runtime, T: ComplexElement>(
    handle: &Handle<R>,
    family: BatchFamily,
    args: HbmvArgs<T>,
) -> Result<()> {
    catch_internal(&routine_name(T::DTYPE, "hbmv", family), || {
        hbmv_template(handle, family, &args)
    })
}

impl<R: Runtime> BandedOps<R> for Handle<R> {
    unsafe fn gbmv<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        x: DevicePtr<T>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
    ) -> Result<()> {
        let args = GbmvArgs {
            trans,
            m,
            n,
            kl,
            ku,
            alpha,
            a: BandMatrixArg::new(a, lda),
            x: VectorArg::new(x, incx),
            beta,
            y: VectorArg::new(y, incy),
            batch_count: 1,
        };
        run_gbmv(self, BatchFamily::Single, args)
    }

    unsafe fn gbmv_batched<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<DevicePtr<T>>,
        lda: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<DevicePtr<T>>,
        incy: i64,
        batch_count: usize,
    ) -> Result<()> {
        let args = GbmvArgs {
            trans,
            m,
            n,
            kl,
            ku,
            alpha,
            a: BandMatrixArg::batched(a, lda),
            x: VectorArg::batched(x, incx),
            beta,
            y: VectorArg::batched(y, incy),
            batch_count,
        };
        run_gbmv(self, BatchFamily::Batched, args)
    }

    unsafe fn gbmv_strided_batched<T: Element>(
        &self,
        trans: Operation,
        m: usize,
        n: usize,
        kl: usize,
        ku: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        stride_a: i64,
        x: DevicePtr<T>,
        incx: i64,
        stride_x: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
        stride_y: i64,
        batch_count: usize,
    ) -> Result<()> {
        let args = GbmvArgs {
            trans,
            m,
            n,
            kl,
            ku,
            alpha,
            a: BandMatrixArg::strided(a, lda, stride_a),
            x: VectorArg::strided(x, incx, stride_x),
            beta,
            y: VectorArg::strided(y, incy, stride_y),
            batch_count,
        };
        run_gbmv(self, BatchFamily::StridedBatched, args)
    }

    unsafe fn hbmv<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        x: DevicePtr<T>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
    ) -> Result<()> {
        let args = HbmvArgs {
            fill,
            n,
            k,
            alpha,
            a: BandMatrixArg::new(a, lda),
            x: VectorArg::new(x, incx),
            beta,
            y: VectorArg::new(y, incy),
            batch_count: 1,
        };
        run_hbmv(self, BatchFamily::Single, args)
    }

    unsafe fn hbmv_batched<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<DevicePtr<T>>,
        lda: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        beta: Scalar<T>,
        y: DevicePtr<DevicePtr<T>>,
        incy: i64,
        batch_count: usize,
    ) -> Result<()> {
        let args = HbmvArgs {
            fill,
            n,
            k,
            alpha,
            a: BandMatrixArg::batched(a, lda),
            x: VectorArg::batched(x, incx),
            beta,
            y: VectorArg::batched(y, incy),
            batch_count,
        };
        run_hbmv(self, BatchFamily::Batched, args)
    }

    unsafe fn hbmv_strided_batched<T: ComplexElement>(
        &self,
        fill: Fill,
        n: usize,
        k: usize,
        alpha: Scalar<T>,
        a: DevicePtr<T>,
        lda: usize,
        stride_a: i64,
        x: DevicePtr<T>,
        incx: i64,
        stride_x: i64,
        beta: Scalar<T>,
        y: DevicePtr<T>,
        incy: i64,
        stride_y: i64,
        batch_count: usize,
    ) -> Result<()> {
        let args = HbmvArgs {
            fill,
            n,
            k,
            alpha,
            a: BandMatrixArg::strided(a, lda, stride_a),
            x: VectorArg::strided(x, incx, stride_x),
            beta,
            y: VectorArg::strided(y, incy, stride_y),
            batch_count,
        };
        run_hbmv(self, BatchFamily::StridedBatched, args)
    }
}
