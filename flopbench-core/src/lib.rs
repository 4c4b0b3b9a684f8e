#![warn(missing_docs)]
//! FlopBench Core - Measurement Protocol
//!
//! This crate provides everything needed to turn a fixed arithmetic workload
//! into one comparable throughput number per execution mode:
//! - `WorkloadSpec` and the scalar/packed recurrence kernels
//! - High-precision timing (RDTSCP/CNTVCT cycle counters with Instant wall clock)
//! - Exact iteration partitioning across threads, vector lanes and GPU work-items
//! - Execution strategies: scalar, vectorized, multi-thread, multi-thread vectorized, GPU
//! - Result aggregation (anti-optimization sink + throughput derivation)
//! - `BenchmarkSuite` sequencing with relative speedup against the scalar baseline

mod aggregate;
mod capability;
mod error;
mod kernel;
mod measure;
mod partition;
mod simd;
mod strategy;
mod suite;

pub use aggregate::{BenchmarkResult, combine, sink, throughput, total_operations};
pub use capability::{Capabilities, DISABLED_BY_CONFIG, DisabledCapabilities};
pub use error::{StrategyError, SuiteError};
pub use kernel::{
    DECAY, DEFAULT_ITERATIONS, INCREMENT, LANE_SEED_STEP, LaneState, OPS_PER_ITERATION,
    WorkloadSpec,
};
/// Whether this platform provides hardware cycle counters (x86_64 RDTSCP or AArch64 CNTVCT_EL0).
/// When `false`, cycle counts are reported as 0 and only wall-clock nanoseconds are available.
pub use measure::HAS_CYCLE_COUNTER;
pub use measure::{Measurement, Timer, measure, pin_to_cpu};
pub use partition::{LaneGroup, Partition, VectorSplit};
pub use simd::{PackedLanes, VECTOR_WIDTH, VectorIsa, VectorUnit};
pub use strategy::{
    ExecutionStrategy, GpuDispatch, GpuOffload, GpuPowerPreference, GpuSettings,
    MultiThreadScalar, MultiThreadVectorized, Scalar, StrategyConfig, StrategyKind, Vectorized,
    WORKGROUP_SIZE, build_strategy, detected_threads,
};
pub use suite::{
    BenchmarkSuite, PlanEntry, PlanStatus, SkippedStrategy, StrategyOutcome, SuiteEvent,
    SuiteReport,
};
