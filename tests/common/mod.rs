//! Common test utilities
#![allow(dead_code)]

use bandr::band::{BandLayout, Fill, HermitianBandLayout, Operation};
use bandr::dtype::{Complex64, Complex128, Element};
use bandr::handle::{Handle, HandleConfig};
use bandr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use bandr::runtime::{DeviceBuffer, DevicePtr, Runtime};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a handle on a fresh CPU client
pub fn create_handle(config: HandleConfig) -> Handle<CpuRuntime> {
    let (client, _) = create_cpu_client();
    Handle::with_client(client, config)
}

/// Upload a host slice
pub fn upload<T: bytemuck::Pod>(data: &[T]) -> DeviceBuffer<CpuRuntime, T> {
    DeviceBuffer::from_slice(data, &CpuDevice::new()).unwrap()
}

/// Upload one device address per buffer
pub fn pointer_array<T: bytemuck::Pod>(
    buffers: &[DeviceBuffer<CpuRuntime, T>],
) -> DeviceBuffer<CpuRuntime, DevicePtr<T>> {
    let ptrs: Vec<DevicePtr<T>> = buffers.iter().map(|b| b.ptr()).collect();
    upload(&ptrs)
}

/// Element construction and inspection through f64 parts
pub trait TestElement: Element {
    /// Build from parts (real types drop `im`)
    fn make(re: f64, im: f64) -> Self;
    /// Split into parts
    fn parts(self) -> (f64, f64);
}

impl TestElement for f32 {
    fn make(re: f64, _im: f64) -> Self {
        re as f32
    }
    fn parts(self) -> (f64, f64) {
        (self as f64, 0.0)
    }
}

impl TestElement for f64 {
    fn make(re: f64, _im: f64) -> Self {
        re
    }
    fn parts(self) -> (f64, f64) {
        (self, 0.0)
    }
}

impl TestElement for Complex64 {
    fn make(re: f64, im: f64) -> Self {
        Complex64::new(re as f32, im as f32)
    }
    fn parts(self) -> (f64, f64) {
        (self.re as f64, self.im as f64)
    }
}

impl TestElement for Complex128 {
    fn make(re: f64, im: f64) -> Self {
        Complex128::new(re, im)
    }
    fn parts(self) -> (f64, f64) {
        (self.re, self.im)
    }
}

/// Deterministic values that are exact in binary (multiples of 1/4 in [-2, 2])
pub fn test_values<T: TestElement>(len: usize, seed: usize) -> Vec<T> {
    (0..len)
        .map(|i| {
            let re = ((i * 7 + seed * 13) % 17) as f64 / 4.0 - 2.0;
            let im = ((i * 5 + seed * 3) % 13) as f64 / 4.0 - 1.5;
            T::make(re, im)
        })
        .collect()
}

/// Logical index `i` of a vector with increment `inc` (BLAS convention)
pub fn blas_index(i: usize, len: usize, inc: i64) -> usize {
    if inc > 0 {
        i * inc as usize
    } else {
        (len - 1 - i) * inc.unsigned_abs() as usize
    }
}

/// Storage length of a vector of `len` elements with increment `inc`
pub fn storage_len(len: usize, inc: i64) -> usize {
    if len == 0 {
        0
    } else {
        (len - 1) * inc.unsigned_abs() as usize + 1
    }
}

fn scale<T: Element>(alpha: T, sum: T, beta: T, y: T) -> T {
    match (alpha.is_zero(), beta.is_zero()) {
        (true, true) => T::zero(),
        (true, false) => beta * y,
        (false, true) => alpha * sum,
        (false, false) => alpha * sum + beta * y,
    }
}

/// Dense reference for `y = alpha * op(A) * x + beta * y` on compact storage
pub fn ref_gbmv<T: Element>(
    trans: Operation,
    layout: &BandLayout,
    alpha: T,
    band: &[T],
    x: &[T],
    incx: i64,
    beta: T,
    y: &mut [T],
    incy: i64,
) {
    let (m, n) = (layout.m, layout.n);
    let x_len = trans.x_len(m, n);
    let y_len = trans.y_len(m, n);
    for out in 0..y_len {
        let mut sum = T::zero();
        for inner in 0..x_len {
            let (i, j) = if trans.is_transposed() { (inner, out) } else { (out, inner) };
            if let Some(idx) = layout.index(i, j) {
                let a = if trans == Operation::ConjugateTranspose {
                    band[idx].conj()
                } else {
                    band[idx]
                };
                sum = sum + a * x[blas_index(inner, x_len, incx)];
            }
        }
        let yi = blas_index(out, y_len, incy);
        y[yi] = scale(alpha, sum, beta, y[yi]);
    }
}

/// Dense reference for `y = alpha * A * x + beta * y` with Hermitian band `A`
pub fn ref_hbmv<T: Element>(
    fill: Fill,
    n: usize,
    k: usize,
    alpha: T,
    band: &[T],
    lda: usize,
    x: &[T],
    incx: i64,
    beta: T,
    y: &mut [T],
    incy: i64,
) {
    let layout = HermitianBandLayout { n, k, lda, fill };
    for i in 0..n {
        let mut sum = T::zero();
        for j in 0..n {
            sum = sum + layout.element(band, i, j) * x[blas_index(j, n, incx)];
        }
        let yi = blas_index(i, n, incy);
        y[yi] = scale(alpha, sum, beta, y[yi]);
    }
}

/// Reference sum of `|re| + |im|`
pub fn ref_asum<T: TestElement>(x: &[T], n: usize, incx: i64) -> f64 {
    if incx <= 0 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let (re, im) = x[i * incx as usize].parts();
            re.abs() + im.abs()
        })
        .sum()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two element slices are close, comparing real and imaginary parts
pub fn assert_allclose<T: TestElement>(a: &[T], b: &[T], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    let split = |v: &[T]| -> Vec<f64> {
        v.iter()
            .flat_map(|e| {
                let (re, im) = e.parts();
                [re, im]
            })
            .collect()
    };
    assert_allclose_f64(&split(a), &split(b), rtol, atol, msg);
}
