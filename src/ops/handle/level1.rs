//! Level1Ops implementation for Handle.

use crate::batch::{ResultArg, VectorArg};
use crate::blas1::asum_template;
use crate::dtype::Element;
use crate::error::{Result, catch_internal};
use crate::handle::Handle;
use crate::logging::{BatchFamily, routine_name};
use crate::ops::Level1Ops;
use crate::runtime::{DevicePtr, Runtime};

impl<R: Runtime> Level1Ops<R> for Handle<R> {
    unsafe fn asum<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<T>,
        incx: i64,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()> {
        let family = BatchFamily::Single;
        catch_internal(&routine_name(T::DTYPE, "asum", family), || {
            asum_template(self, family, n, &VectorArg::new(x, incx), 1, result)
        })
    }

    unsafe fn asum_batched<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<DevicePtr<T>>,
        incx: i64,
        batch_count: usize,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()> {
        let family = BatchFamily::Batched;
        catch_internal(&routine_name(T::DTYPE, "asum", family), || {
            asum_template(self, family, n, &VectorArg::batched(x, incx), batch_count, result)
        })
    }

    unsafe fn asum_strided_batched<T: Element>(
        &self,
        n: usize,
        x: DevicePtr<T>,
        incx: i64,
        stridex: i64,
        batch_count: usize,
        result: ResultArg<'_, T::Real>,
    ) -> Result<()> {
        let family = BatchFamily::StridedBatched;
        catch_internal(&routine_name(T::DTYPE, "asum", family), || {
            asum_template(
                self,
                family,
                n,
                &VectorArg::strided(x, incx, stridex),
                batch_count,
                result,
            )
        })
    }
}
