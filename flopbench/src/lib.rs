#![warn(missing_docs)]
//! # FlopBench
//!
//! Floating-point throughput benchmark: one fixed arithmetic workload, five
//! execution modes, one comparable number each.
//!
//! - **Scalar**: single thread, scalar `f64` (the speedup baseline)
//! - **Vectorized**: single thread, 4-wide packed `f64` with FMA (AVX2 or NEON)
//! - **Multi-thread**: every core runs its own scalar lane
//! - **Multi-thread + SIMD**: every core runs packed lanes
//! - **GPU**: WGSL compute shader through `wgpu` (the `gpu` feature)
//!
//! Every mode executes exactly the requested iteration count (remainders are
//! redistributed, never dropped), times only its compute region, and routes
//! lane results through an opaque sink so the work cannot be elided.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flopbench::prelude::*;
//!
//! let caps = Capabilities::detect();
//! let suite = BenchmarkSuite::new(&caps, &StrategyKind::ALL, &StrategyConfig::default());
//! let report = suite.run(&WorkloadSpec::new(100_000_000)?);
//!
//! for result in report.results() {
//!     println!("{}: {:.2}x", result.name(), report.relative_speedup(result.name())?);
//! }
//! ```

// Re-export core types
pub use flopbench_core::{
    BenchmarkResult, BenchmarkSuite, Capabilities, DISABLED_BY_CONFIG, DisabledCapabilities,
    ExecutionStrategy, GpuDispatch, GpuOffload, GpuSettings, LaneGroup, Measurement,
    MultiThreadScalar, MultiThreadVectorized, OPS_PER_ITERATION, Partition, PlanEntry, PlanStatus,
    Scalar, SkippedStrategy, StrategyConfig, StrategyError, StrategyKind, StrategyOutcome,
    SuiteError, SuiteEvent, SuiteReport, Timer, Vectorized, WorkloadSpec, build_strategy,
};

// Re-export report types
pub use flopbench_report::{OutputFormat, Report, format_speedup, format_throughput};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchmarkResult, BenchmarkSuite, Capabilities, ExecutionStrategy, StrategyConfig,
        StrategyError, StrategyKind, SuiteReport, WorkloadSpec,
    };
}

/// Run the FlopBench CLI.
///
/// ```ignore
/// fn main() {
///     flopbench::run().unwrap();
/// }
/// ```
pub use flopbench_cli::run;

// Re-export the runner pipeline for embedding
pub use flopbench_cli::{
    FlopConfig, RunSettings, SCHEMA_VERSION, build_suite, render_report, run_suite, write_outputs,
};
