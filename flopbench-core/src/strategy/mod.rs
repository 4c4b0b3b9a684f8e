//! Execution Strategies
//!
//! Each strategy drives the same recurrence under a different parallelism
//! discipline and bounds only its compute region with a [`Timer`]:
//!
//! ```text
//! WorkloadSpec ──► Partition ──► lanes ──► sink ──► BenchmarkResult
//!                  (exact)       │                  (ops × 4 / elapsed)
//!                                ├─ Scalar                 1 lane
//!                                ├─ Vectorized             4 packed sub-lanes + tail
//!                                ├─ MultiThreadScalar      N threads
//!                                ├─ MultiThreadVectorized  N threads × 4 packed
//!                                └─ GpuOffload             workgroups × 256 items
//! ```
//!
//! [`Timer`]: crate::Timer

mod gpu;
mod scalar;
mod threaded;
mod vectorized;

pub use gpu::{GpuDispatch, GpuOffload, GpuPowerPreference, GpuSettings, WORKGROUP_SIZE};
pub use scalar::Scalar;
pub use threaded::{MultiThreadScalar, MultiThreadVectorized};
pub use vectorized::Vectorized;

use crate::aggregate::BenchmarkResult;
use crate::error::{StrategyError, SuiteError};
use crate::kernel::WorkloadSpec;
use crate::measure::pin_to_cpu;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The execution modes, in suite order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// One thread, one lane
    Scalar,
    /// One thread, packed SIMD sub-lanes
    Vectorized,
    /// N threads, one lane each
    MultiThreadScalar,
    /// N threads, packed SIMD sub-lanes each
    MultiThreadVectorized,
    /// GPU compute work-items
    GpuOffload,
}

impl StrategyKind {
    /// All kinds in canonical execution order
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Scalar,
        StrategyKind::Vectorized,
        StrategyKind::MultiThreadScalar,
        StrategyKind::MultiThreadVectorized,
        StrategyKind::GpuOffload,
    ];

    /// Stable name used in results and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Scalar => "scalar",
            StrategyKind::Vectorized => "vectorized",
            StrategyKind::MultiThreadScalar => "multi-thread-scalar",
            StrategyKind::MultiThreadVectorized => "multi-thread-vectorized",
            StrategyKind::GpuOffload => "gpu-offload",
        }
    }

    /// One-line description for listings
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Scalar => "single thread, scalar f64",
            StrategyKind::Vectorized => "single thread, 4-wide packed f64 with FMA",
            StrategyKind::MultiThreadScalar => "all worker threads, scalar f64",
            StrategyKind::MultiThreadVectorized => "all worker threads, 4-wide packed f64 with FMA",
            StrategyKind::GpuOffload => "GPU compute shader, f32 with FMA",
        }
    }

    /// Whether this is the speedup reference
    pub fn is_baseline(&self) -> bool {
        matches!(self, StrategyKind::Scalar)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SuiteError::UnknownStrategy(s.to_string()))
    }
}

/// One way of executing the workload
pub trait ExecutionStrategy: Send + Sync {
    /// Which mode this is
    fn kind(&self) -> StrategyKind;

    /// Result name (defaults to the kind's name)
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Execute the whole workload once and measure it
    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError>;
}

/// Knobs shared by the strategy constructors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyConfig {
    /// Worker threads for multi-thread strategies (`None` = detected cores)
    pub threads: Option<usize>,
    /// CPU to pin single-lane strategies to
    pub pin_cpu: Option<usize>,
    /// GPU dispatch settings
    pub gpu: GpuSettings,
}

impl StrategyConfig {
    /// Worker threads to use, never zero
    pub fn worker_threads(&self) -> usize {
        match self.threads {
            Some(n) if n > 0 => n,
            _ => detected_threads(),
        }
    }
}

/// Logical cores reported by the OS, or 1 when unknown
pub fn detected_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Construct the strategy for `kind`.
///
/// Setup that must stay outside the timed region (vector unit detection, thread
/// pool, GPU device and pipeline) happens here.
pub fn build_strategy(
    kind: StrategyKind,
    config: &StrategyConfig,
) -> Result<Box<dyn ExecutionStrategy>, StrategyError> {
    let strategy: Box<dyn ExecutionStrategy> = match kind {
        StrategyKind::Scalar => Box::new(Scalar::new(config.pin_cpu)),
        StrategyKind::Vectorized => Box::new(Vectorized::new(config.pin_cpu)?),
        StrategyKind::MultiThreadScalar => {
            Box::new(MultiThreadScalar::new(config.worker_threads())?)
        }
        StrategyKind::MultiThreadVectorized => {
            Box::new(MultiThreadVectorized::new(config.worker_threads())?)
        }
        StrategyKind::GpuOffload => Box::new(GpuOffload::new(&config.gpu)?),
    };
    Ok(strategy)
}

/// Run single-lane work, on a dedicated pinned thread when `pin_cpu` is set.
///
/// Pinning happens off the caller's thread so later pools do not inherit
/// the affinity mask. A panic in the worker is re-raised on the caller.
pub(crate) fn run_single_lane<T, F>(pin_cpu: Option<usize>, work: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let Some(cpu) = pin_cpu else {
        return work();
    };

    std::thread::scope(|scope| {
        let handle = scope.spawn(move || {
            if let Err(e) = pin_to_cpu(cpu) {
                tracing::warn!(cpu, error = %e, "failed to pin benchmark thread");
            }
            work()
        });
        match handle.join() {
            Ok(value) => value,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert!(matches!(
            "quantum".parse::<StrategyKind>(),
            Err(SuiteError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_canonical_order_is_sorted() {
        let mut sorted = StrategyKind::ALL;
        sorted.sort();
        assert_eq!(sorted, StrategyKind::ALL);
        assert!(StrategyKind::Scalar.is_baseline());
    }

    #[test]
    fn test_worker_threads_never_zero() {
        let config = StrategyConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(config.worker_threads() >= 1);
        let config = StrategyConfig {
            threads: Some(3),
            ..Default::default()
        };
        assert_eq!(config.worker_threads(), 3);
    }

    #[test]
    fn test_single_lane_pinned_runs_work() {
        assert_eq!(run_single_lane(None, || 5), 5);
        assert_eq!(run_single_lane(Some(0), || 6), 6);
    }

    #[test]
    fn test_serde_names_are_kebab_case() {
        let json = serde_json::to_string(&StrategyKind::MultiThreadVectorized).unwrap();
        assert_eq!(json, "\"multi-thread-vectorized\"");
    }
}
