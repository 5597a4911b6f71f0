//! Integration tests for handle configuration, size queries and workspace

mod common;

use std::collections::HashMap;

use bandr::handle::{CHECK_NUMERICS_ENV, DEVICE_MEMORY_SIZE_ENV, LAYER_ENV};
use bandr::prelude::*;
use common::{create_handle, upload};

#[test]
fn test_config_from_lookup() {
    let vars: HashMap<&str, &str> = [
        (LAYER_ENV, "5"),
        (CHECK_NUMERICS_ENV, "12"),
        (DEVICE_MEMORY_SIZE_ENV, " 4096 "),
    ]
    .into_iter()
    .collect();
    let config = HandleConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

    assert_eq!(
        config.layer_mode,
        LayerMode {
            trace: true,
            bench: false,
            profile: true
        }
    );
    assert!(config.check_numerics.fail && config.check_numerics.only_nan_inf);
    assert!(!config.check_numerics.info && !config.check_numerics.warn);
    assert_eq!(config.workspace_limit, Some(4096));
}

#[test]
fn test_config_ignores_garbage() {
    let config = HandleConfig::from_lookup(|name| match name {
        LAYER_ENV => Some("verbose".to_string()),
        DEVICE_MEMORY_SIZE_ENV => Some("-1".to_string()),
        _ => None,
    });
    assert_eq!(config, HandleConfig::default());
}

#[test]
fn test_size_query_pairing() {
    let handle = create_handle(HandleConfig::default());
    assert!(!handle.is_device_memory_size_query());
    assert_eq!(handle.stop_device_memory_size_query(), Err(Error::SizeQueryMismatch));

    handle.start_device_memory_size_query().unwrap();
    assert!(handle.is_device_memory_size_query());
    assert_eq!(handle.start_device_memory_size_query(), Err(Error::SizeQueryMismatch));
    assert_eq!(handle.stop_device_memory_size_query(), Ok(0));
    assert!(!handle.is_device_memory_size_query());
}

#[test]
fn test_size_query_then_limit_fits() {
    let x = upload(&vec![0.5f32; 5000]);
    let mut out = [0.0f32; 2];

    let sizing = create_handle(HandleConfig::default());
    sizing.start_device_memory_size_query().unwrap();
    unsafe {
        sizing
            .asum_strided_batched(2500, x.ptr(), 1, 2500, 2, ResultArg::Host(&mut out))
            .unwrap()
    };
    let bytes = sizing.stop_device_memory_size_query().unwrap();
    assert_eq!(bytes, 4 * (5 + 1) * 2);

    // A pool of exactly the queried size is enough
    let handle = create_handle(HandleConfig::default().with_workspace_limit(bytes));
    unsafe {
        handle
            .asum_strided_batched(2500, x.ptr(), 1, 2500, 2, ResultArg::Host(&mut out))
            .unwrap()
    };
    assert_eq!(out, [1250.0, 1250.0]);
}

#[test]
fn test_workspace_is_released() {
    let handle = create_handle(HandleConfig::default().with_workspace_limit(64));
    {
        let ws = handle.device_malloc(48).unwrap();
        assert_eq!(ws.size(), 48);
        assert_eq!(handle.workspace_in_use(), 48);
        assert_eq!(handle.device_malloc(32).unwrap_err(), Error::MemoryError { size: 32 });
    }
    assert_eq!(handle.workspace_in_use(), 0);
    handle.device_malloc(64).unwrap();
}

#[test]
fn test_logging_layers_do_not_change_results() {
    let layers = LayerMode {
        trace: true,
        bench: true,
        profile: true,
    };
    let handle = create_handle(HandleConfig::default().with_layer_mode(layers));
    let a = upload(&[0.0f64, 2.0, 1.0, 1.0, 2.0, 0.0]);
    let x = upload(&[1.0f64, 1.0]);
    let y = upload(&[0.0f64; 2]);
    unsafe {
        handle
            .gbmv(
                Operation::None,
                2,
                2,
                1,
                1,
                Scalar::Host(1.0),
                a.ptr(),
                3,
                x.ptr(),
                1,
                Scalar::Host(0.0),
                y.ptr(),
                1,
            )
            .unwrap()
    };
    assert_eq!(y.to_vec().unwrap(), vec![3.0, 3.0]);

    // Logged even when validation fails
    let err = unsafe {
        handle.gbmv(
            Operation::None,
            2,
            2,
            1,
            1,
            Scalar::Host(1.0),
            a.ptr(),
            3,
            x.ptr(),
            0,
            Scalar::Host(0.0),
            y.ptr(),
            1,
        )
    };
    assert!(matches!(err, Err(Error::InvalidValue { arg: "incx", .. })));
}

#[test]
fn test_runtime_buffers() {
    let device = CpuRuntime::default_device();
    let buf = DeviceBuffer::<CpuRuntime, f64>::from_slice(&[1.0, 2.0, 3.0], &device).unwrap();
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.size_in_bytes(), 24);
    assert_eq!(buf.to_vec().unwrap(), vec![1.0, 2.0, 3.0]);
    assert_eq!(buf.ptr().addr() % 64, 0);

    let empty = DeviceBuffer::<CpuRuntime, f32>::zeroed(0, &device).unwrap();
    assert!(empty.is_empty());
    assert!(empty.ptr().is_null());
}
