//! Call logging layers
//!
//! Each public call can be reported through three `tracing` targets, enabled
//! per handle by [`LayerMode`]:
//!
//! ```text
//! bandr::trace    sgbmv,N,5,5,2,1,1,0x7f..,4,0x7f..,1,0,0x7f..,1
//! bandr::bench    bandr-bench -f gbmv -r f32_r --transposeA N -m 5 -n 5 --kl 2 --ku 1 --alpha 1 --lda 4 --incx 1 --beta 0 --incy 1
//! bandr::profile  { function: sgbmv, transA: N, M: 5, N: 5, kl: 2, ku: 1, lda: 4, incx: 1, incy: 1 }
//! ```
//!
//! Scalars are printed by value only when they live on the host; a device
//! scalar appears as its address in the trace line and is omitted from the
//! bench line.

use crate::batch::Scalar;
use crate::dtype::{DType, Element};
use crate::handle::LayerMode;
use std::fmt::Display;

/// Target of trace lines
pub const TRACE_TARGET: &str = "bandr::trace";
/// Target of bench lines
pub const BENCH_TARGET: &str = "bandr::bench";
/// Target of profile records
pub const PROFILE_TARGET: &str = "bandr::profile";

/// Instance family of a call
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BatchFamily {
    /// One instance
    Single,
    /// Pointer-array batch
    Batched,
    /// Strided batch
    StridedBatched,
}

impl BatchFamily {
    /// Suffix appended to routine names
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Single => "",
            Self::Batched => "_batched",
            Self::StridedBatched => "_strided_batched",
        }
    }
}

/// Public name of a routine, e.g. `sgbmv`, `zhbmv_batched`, `scasum`
///
/// Level-1 reductions of complex vectors carry both the input and the result
/// prefix (`scasum`, `dzasum`).
pub fn routine_name(dtype: DType, routine: &str, family: BatchFamily) -> String {
    let prefix = match (routine, dtype) {
        ("asum", DType::Complex64) => "sc",
        ("asum", DType::Complex128) => "dz",
        _ => dtype.blas_prefix(),
    };
    format!("{prefix}{routine}{}", family.suffix())
}

/// The arguments of one call, rendered for every logging layer
#[derive(Clone, Debug)]
pub struct CallLog {
    function: String,
    bench_routine: String,
    precision: &'static str,
    trace: Vec<String>,
    bench: Vec<String>,
    profile: Vec<(&'static str, String)>,
}

impl CallLog {
    /// Start a log for `routine` (e.g. `gbmv`) of element type `dtype`
    pub fn new(dtype: DType, routine: &str, family: BatchFamily) -> Self {
        Self {
            function: routine_name(dtype, routine, family),
            bench_routine: format!("{routine}{}", family.suffix()),
            precision: dtype.precision_str(),
            trace: Vec::new(),
            bench: Vec::new(),
            profile: Vec::new(),
        }
    }

    /// Name of the logged function
    pub fn function(&self) -> &str {
        &self.function
    }

    /// An argument that appears in every layer
    pub fn arg(mut self, bench_flag: &'static str, profile_key: &'static str, value: impl Display) -> Self {
        let value = value.to_string();
        self.bench.push(format!("{bench_flag} {value}"));
        self.profile.push((profile_key, value.clone()));
        self.trace.push(value);
        self
    }

    /// A buffer address, only traced
    pub fn ptr(mut self, value: impl Display) -> Self {
        self.trace.push(value.to_string());
        self
    }

    /// A scalar multiplier (`alpha`, `beta`)
    pub fn scalar<T: Element>(mut self, name: &'static str, value: Scalar<T>) -> Self {
        self.trace.push(value.to_string());
        if let Some(v) = value.host_value() {
            self.bench.push(format!("--{name} {}", v.real()));
            if T::DTYPE.is_complex() {
                self.bench.push(format!("--{name}i {}", v.imag()));
            }
        }
        self
    }

    /// Comma-separated trace line
    pub fn trace_line(&self) -> String {
        let mut line = self.function.clone();
        for value in &self.trace {
            line.push(',');
            line.push_str(value);
        }
        line
    }

    /// Replayable bench command line
    pub fn bench_line(&self) -> String {
        let mut line = format!("bandr-bench -f {} -r {}", self.bench_routine, self.precision);
        for token in &self.bench {
            line.push(' ');
            line.push_str(token);
        }
        line
    }

    /// Profile record
    pub fn profile_line(&self) -> String {
        let mut line = format!("{{ function: {}", self.function);
        for (key, value) in &self.profile {
            line.push_str(&format!(", {key}: {value}"));
        }
        line.push_str(" }");
        line
    }

    /// Emit the lines of every active layer
    pub fn emit(&self, mode: LayerMode) {
        if mode.trace {
            tracing::info!(target: TRACE_TARGET, "{}", self.trace_line());
        }
        if mode.bench {
            tracing::info!(target: BENCH_TARGET, "{}", self.bench_line());
        }
        if mode.profile {
            tracing::info!(target: PROFILE_TARGET, "{}", self.profile_line());
        }
    }
}
