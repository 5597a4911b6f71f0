//! Integration tests for the sum of magnitudes reduction

mod common;

use bandr::prelude::*;
use common::{TestElement, assert_allclose_f64, create_handle, pointer_array, ref_asum, test_values, upload};

fn to_f64<R: TestElement>(v: &[R]) -> Vec<f64> {
    v.iter().map(|e| e.parts().0).collect()
}

fn check_asum<T: TestElement>()
where
    T::Real: TestElement,
{
    let handle = create_handle(HandleConfig::default());
    for (n, incx) in [(1, 1), (7, 2), (512, 1), (513, 1), (1500, 3)] {
        let x: Vec<T> = test_values((n - 1) * incx as usize + 1, n);
        let x_buf = upload(&x);
        let expected = ref_asum(&x, n, incx);

        let mut host = [<T::Real as Element>::zero()];
        unsafe { handle.asum(n, x_buf.ptr(), incx, ResultArg::Host(&mut host)).unwrap() };

        let device = DeviceBuffer::<CpuRuntime, T::Real>::zeroed(1, handle.device()).unwrap();
        unsafe { handle.asum(n, x_buf.ptr(), incx, ResultArg::Device(device.ptr())).unwrap() };

        let msg = format!("{} asum n={n} incx={incx}", T::DTYPE);
        assert_allclose_f64(&to_f64(&host), &[expected], 1e-5, 1e-5, &msg);
        assert_allclose_f64(&to_f64(&device.to_vec().unwrap()), &[expected], 1e-5, 1e-5, &msg);
    }
    // No workspace outlives a call
    assert_eq!(handle.workspace_in_use(), 0);
}

#[test]
fn test_asum_f32() {
    check_asum::<f32>();
}

#[test]
fn test_asum_f64() {
    check_asum::<f64>();
}

#[test]
fn test_asum_complex64() {
    check_asum::<Complex64>();
}

#[test]
fn test_asum_complex128() {
    check_asum::<Complex128>();
}

#[test]
fn test_complex_magnitude_is_sum_of_parts() {
    let handle = create_handle(HandleConfig::default());
    let x = upload(&[Complex128::new(3.0, -4.0), Complex128::new(-0.5, 0.25)]);
    let mut out = [0.0f64];
    unsafe { handle.asum(2, x.ptr(), 1, ResultArg::Host(&mut out)).unwrap() };
    assert_eq!(out[0], 7.75);
}

#[test]
fn test_nothing_to_sum_writes_zero() {
    let handle = create_handle(HandleConfig::default());
    let x = upload(&[1.0f32, 2.0]);

    for (n, incx) in [(0, 1), (2, 0), (2, -1)] {
        let mut out = [5.0f32];
        unsafe { handle.asum(n, x.ptr(), incx, ResultArg::Host(&mut out)).unwrap() };
        assert_eq!(out, [0.0], "n={n} incx={incx}");
    }

    let device = upload(&[5.0f64, 5.0, 5.0]);
    unsafe {
        handle
            .asum_strided_batched::<f64>(0, DevicePtr::null(), 1, 4, 3, ResultArg::Device(device.ptr()))
            .unwrap()
    };
    assert_eq!(device.to_vec().unwrap(), vec![0.0; 3]);
    assert_eq!(handle.client().kernel_launches(), 0);
}

#[test]
fn test_batched_families() {
    let handle = create_handle(HandleConfig::default());
    let (n, incx, batch) = (600usize, 2i64, 3usize);
    let stride = 1300usize;
    let all: Vec<Complex64> = test_values(stride * batch, 9);
    let expected: Vec<f64> = (0..batch)
        .map(|b| ref_asum(&all[b * stride..], n, incx))
        .collect();

    let x_buf = upload(&all);
    let mut strided = [0.0f32; 3];
    unsafe {
        handle
            .asum_strided_batched(n, x_buf.ptr(), incx, stride as i64, batch, ResultArg::Host(&mut strided))
            .unwrap()
    };
    assert_allclose_f64(&to_f64(&strided), &expected, 1e-5, 1e-5, "strided");

    let bufs: Vec<_> = all.chunks(stride).map(upload).collect();
    let ptrs = pointer_array(&bufs);
    let results = DeviceBuffer::<CpuRuntime, f32>::zeroed(batch, handle.device()).unwrap();
    unsafe {
        handle
            .asum_batched(n, ptrs.ptr(), incx, batch, ResultArg::Device(results.ptr()))
            .unwrap()
    };
    assert_allclose_f64(&to_f64(&results.to_vec().unwrap()), &expected, 1e-5, 1e-5, "pointer array");
}

#[test]
fn test_size_query_reports_workspace() {
    let handle = create_handle(HandleConfig::default());
    let x = upload(&[1.0f64; 4]);

    handle.start_device_memory_size_query().unwrap();
    let mut out = [9.0f64; 4];
    // Two partial blocks plus one result slot, per instance
    unsafe {
        handle
            .asum_strided_batched(1000, x.ptr(), 1, 0, 4, ResultArg::Host(&mut out))
            .unwrap()
    };
    // Smaller requirements do not lower the recorded size
    unsafe { handle.asum(10, x.ptr(), 1, ResultArg::Host(&mut out)).unwrap() };
    // Nothing to sum records nothing
    unsafe { handle.asum(0, x.ptr(), 1, ResultArg::Host(&mut out)).unwrap() };
    assert_eq!(handle.stop_device_memory_size_query(), Ok(8 * 3 * 4));

    // The query computed nothing and wrote nothing
    assert_eq!(out, [9.0; 4]);
    assert_eq!(handle.client().kernel_launches(), 0);

    let complex = upload(&[Complex64::ONE; 4]);
    handle.start_device_memory_size_query().unwrap();
    let mut out = [0.0f32];
    unsafe { handle.asum(512, complex.ptr(), 1, ResultArg::Host(&mut out)).unwrap() };
    assert_eq!(handle.stop_device_memory_size_query(), Ok(4 * 2));
}

#[test]
fn test_workspace_limit() {
    let x: Vec<f32> = test_values(2048, 1);
    // 4 blocks + 1 result, 4 bytes each
    let needed = 4 * 5;

    let handle = create_handle(HandleConfig::default().with_workspace_limit(needed - 1));
    let x_buf = upload(&x);
    let mut out = [0.0f32];
    assert_eq!(
        unsafe { handle.asum(2048, x_buf.ptr(), 1, ResultArg::Host(&mut out)) },
        Err(Error::MemoryError { size: needed })
    );
    assert_eq!(handle.client().kernel_launches(), 0);

    let handle = create_handle(HandleConfig::default().with_workspace_limit(needed));
    let x_buf = upload(&x);
    unsafe { handle.asum(2048, x_buf.ptr(), 1, ResultArg::Host(&mut out)).unwrap() };
    assert_allclose_f64(&[out[0] as f64], &[ref_asum(&x, 2048, 1)], 1e-5, 1e-5, "limit");
    assert_eq!(handle.client().kernel_launches(), 2);
}

#[test]
fn test_argument_errors() {
    let handle = create_handle(HandleConfig::default());
    let x = upload(&[1.0f64; 4]);

    assert_eq!(
        unsafe { handle.asum::<f64>(4, x.ptr(), 1, ResultArg::Device(DevicePtr::null())) },
        Err(Error::invalid_pointer("result"))
    );
    let mut out = [0.0f64];
    assert_eq!(
        unsafe { handle.asum::<f64>(4, DevicePtr::null(), 1, ResultArg::Host(&mut out)) },
        Err(Error::invalid_pointer("x"))
    );
    let mut short = [0.0f64; 1];
    assert!(matches!(
        unsafe { handle.asum_strided_batched(4, x.ptr(), 1, 0, 2, ResultArg::Host(&mut short)) },
        Err(Error::InvalidValue { arg: "result", .. })
    ));
}
