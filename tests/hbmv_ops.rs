//! Integration tests for Hermitian band matrix-vector products

mod common;

use bandr::prelude::*;
use common::{
    TestElement, assert_allclose, create_handle, pointer_array, ref_hbmv, storage_len, test_values,
    upload,
};

fn check_hbmv<T: TestElement + ComplexElement>(
    fill: Fill,
    n: usize,
    k: usize,
    lda_pad: usize,
    incx: i64,
    incy: i64,
) {
    let handle = create_handle(HandleConfig::default());
    let lda = k + 1 + lda_pad;
    let band: Vec<T> = test_values(lda * n, 1);
    let x: Vec<T> = test_values(storage_len(n, incx), 2);
    let y0: Vec<T> = test_values(storage_len(n, incy), 3);
    let alpha = T::make(0.5, 1.25);
    let beta = T::make(-1.0, 0.5);

    let a_buf = upload(&band);
    let x_buf = upload(&x);
    let y_buf = upload(&y0);
    unsafe {
        handle
            .hbmv(
                fill,
                n,
                k,
                Scalar::Host(alpha),
                a_buf.ptr(),
                lda,
                x_buf.ptr(),
                incx,
                Scalar::Host(beta),
                y_buf.ptr(),
                incy,
            )
            .unwrap()
    };

    let mut expected = y0.clone();
    ref_hbmv(fill, n, k, alpha, &band, lda, &x, incx, beta, &mut expected, incy);
    assert_allclose(
        &y_buf.to_vec().unwrap(),
        &expected,
        1e-5,
        1e-5,
        &format!("{} hbmv {fill} n={n} k={k}", T::DTYPE),
    );
}

fn check_all_shapes<T: TestElement + ComplexElement>() {
    for fill in [Fill::Upper, Fill::Lower] {
        for (n, k) in [(1, 0), (5, 1), (8, 3), (9, 8), (70, 4), (12, 20)] {
            check_hbmv::<T>(fill, n, k, 0, 1, 1);
            check_hbmv::<T>(fill, n, k, 1, -2, 3);
        }
    }
}

#[test]
fn test_matches_reference_complex64() {
    check_all_shapes::<Complex64>();
}

#[test]
fn test_matches_reference_complex128() {
    check_all_shapes::<Complex128>();
}

#[test]
fn test_upper_and_lower_storage_agree() {
    let handle = create_handle(HandleConfig::default());
    let (n, k) = (7, 2);

    // Dense Hermitian matrix, column-major
    let mut dense = vec![Complex128::ZERO; n * n];
    for j in 0..n {
        for i in 0..n {
            if i.abs_diff(j) > k {
                continue;
            }
            let (lo, hi) = (i.min(j), i.max(j));
            let v = Complex128::new((lo + hi) as f64 * 0.5, (hi - lo) as f64 * 0.25);
            dense[i + j * n] = if i >= j { v } else { v.conj() };
            if i == j {
                dense[i + j * n] = Complex128::new(1.0 + i as f64, 0.0);
            }
        }
    }
    let x: Vec<Complex128> = test_values(n, 4);
    let x_buf = upload(&x);

    let mut outputs = Vec::new();
    for fill in [Fill::Upper, Fill::Lower] {
        let layout = HermitianBandLayout::new(n, k, fill);
        let mut band = layout.pack(&dense, n);
        // Imaginary parts on the diagonal are ignored
        for i in 0..n {
            if let Some((idx, _)) = layout.source(i, i) {
                band[idx].im = 99.0;
            }
        }
        let a_buf = upload(&band);
        let y = DeviceBuffer::<CpuRuntime, Complex128>::zeroed(n, handle.device()).unwrap();
        unsafe {
            handle
                .hbmv(
                    fill,
                    n,
                    k,
                    Scalar::Host(Complex128::ONE),
                    a_buf.ptr(),
                    layout.lda,
                    x_buf.ptr(),
                    1,
                    Scalar::Host(Complex128::ZERO),
                    y.ptr(),
                    1,
                )
                .unwrap()
        };
        outputs.push(y.to_vec().unwrap());
    }

    let mut dense_product = vec![Complex128::ZERO; n];
    for (i, out) in dense_product.iter_mut().enumerate() {
        for j in 0..n {
            *out = *out + dense[i + j * n] * x[j];
        }
    }
    assert_allclose(&outputs[0], &dense_product, 1e-12, 1e-12, "upper");
    assert_allclose(&outputs[1], &dense_product, 1e-12, 1e-12, "lower");
}

#[test]
fn test_batched_families_agree() {
    let handle = create_handle(HandleConfig::default());
    let (n, k, lda, batch) = (9, 2, 4, 4);
    let stride_a = lda * n;
    let bands: Vec<Complex64> = test_values(stride_a * batch, 5);
    let xs: Vec<Complex64> = test_values(n * batch, 6);
    let ys: Vec<Complex64> = test_values(n * batch, 7);
    let alpha = Complex64::new(1.0, -0.5);
    let beta = Complex64::new(0.25, 0.0);

    let a_buf = upload(&bands);
    let x_buf = upload(&xs);
    let y_buf = upload(&ys);
    unsafe {
        handle
            .hbmv_strided_batched(
                Fill::Upper,
                n,
                k,
                Scalar::Host(alpha),
                a_buf.ptr(),
                lda,
                stride_a as i64,
                x_buf.ptr(),
                -1,
                n as i64,
                Scalar::Host(beta),
                y_buf.ptr(),
                1,
                n as i64,
                batch,
            )
            .unwrap()
    };

    let a_bufs: Vec<_> = bands.chunks(stride_a).map(upload).collect();
    let x_bufs: Vec<_> = xs.chunks(n).map(upload).collect();
    let y_bufs: Vec<_> = ys.chunks(n).map(upload).collect();
    let (a_arr, x_arr, y_arr) = (pointer_array(&a_bufs), pointer_array(&x_bufs), pointer_array(&y_bufs));
    unsafe {
        handle
            .hbmv_batched(
                Fill::Upper,
                n,
                k,
                Scalar::Host(alpha),
                a_arr.ptr(),
                lda,
                x_arr.ptr(),
                -1,
                Scalar::Host(beta),
                y_arr.ptr(),
                1,
                batch,
            )
            .unwrap()
    };

    let strided_out = y_buf.to_vec().unwrap();
    for b in 0..batch {
        let mut expected = ys[b * n..(b + 1) * n].to_vec();
        ref_hbmv(
            Fill::Upper,
            n,
            k,
            alpha,
            &bands[b * stride_a..(b + 1) * stride_a],
            lda,
            &xs[b * n..(b + 1) * n],
            -1,
            beta,
            &mut expected,
            1,
        );
        assert_allclose(&strided_out[b * n..(b + 1) * n], &expected, 1e-5, 1e-5, "strided");
        assert_allclose(&y_bufs[b].to_vec().unwrap(), &expected, 1e-5, 1e-5, "pointer array");
    }
}

#[test]
fn test_quick_returns_and_errors() {
    let handle = create_handle(HandleConfig::default());
    let y = upload(&[Complex64::ONE; 3]);

    // alpha == 0, beta == 1: no launch, A and x may be null
    unsafe {
        handle
            .hbmv(
                Fill::Lower,
                3,
                1,
                Scalar::Host(Complex64::ZERO),
                DevicePtr::null(),
                2,
                DevicePtr::null(),
                1,
                Scalar::Host(Complex64::ONE),
                y.ptr(),
                1,
            )
            .unwrap()
    };
    // batch_count == 0: no launch, everything may be null
    unsafe {
        handle
            .hbmv_batched::<Complex128>(
                Fill::Upper,
                3,
                1,
                Scalar::Host(Complex128::ONE),
                DevicePtr::null(),
                2,
                DevicePtr::null(),
                1,
                Scalar::Host(Complex128::ZERO),
                DevicePtr::null(),
                1,
                0,
            )
            .unwrap()
    };
    assert_eq!(handle.client().kernel_launches(), 0);

    let lda_err = unsafe {
        handle.hbmv(
            Fill::Lower,
            3,
            2,
            Scalar::Host(Complex64::ONE),
            y.ptr(),
            2,
            y.ptr(),
            1,
            Scalar::Host(Complex64::ZERO),
            y.ptr(),
            1,
        )
    };
    assert!(matches!(lda_err, Err(Error::InvalidValue { arg: "lda", .. })));

    let null_y = unsafe {
        handle.hbmv(
            Fill::Lower,
            3,
            1,
            Scalar::Host(Complex64::ONE),
            y.ptr(),
            2,
            y.ptr(),
            1,
            Scalar::Host(Complex64::ZERO),
            DevicePtr::null(),
            1,
        )
    };
    assert_eq!(null_y, Err(Error::invalid_pointer("y")));

    let k_err = unsafe {
        handle.hbmv(
            Fill::Upper,
            3,
            usize::MAX,
            Scalar::Host(Complex64::ONE),
            y.ptr(),
            usize::MAX,
            y.ptr(),
            1,
            Scalar::Host(Complex64::ZERO),
            y.ptr(),
            1,
        )
    };
    assert!(matches!(k_err, Err(Error::InvalidValue { arg: "k", .. })));
    assert_eq!(y.to_vec().unwrap(), vec![Complex64::ONE; 3]);
}
