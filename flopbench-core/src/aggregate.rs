//! Result Aggregation
//!
//! Per-lane terminal values are combined into one scalar and routed through
//! an opaque sink so no lane's work can be eliminated. Throughput is derived
//! from the executed operation count and the timed interval.

use crate::error::StrategyError;
use crate::kernel::OPS_PER_ITERATION;
use crate::measure::Measurement;
use crate::partition::LaneGroup;
use serde::{Deserialize, Serialize};
use std::hint::black_box;

/// Combine lane terminal values by summation
pub fn combine(lanes: impl IntoIterator<Item = f64>) -> f64 {
    lanes.into_iter().sum()
}

/// Route a value through `black_box` so its producers stay live
#[inline(always)]
pub fn sink(value: f64) -> f64 {
    black_box(value)
}

/// Operations represented by `iterations` executed kernel iterations
pub fn total_operations(iterations: u64) -> u64 {
    iterations.saturating_mul(OPS_PER_ITERATION)
}

/// Operations per second, rejecting any input that cannot give a finite rate
pub fn throughput(total_operations: u64, elapsed_seconds: f64) -> Result<f64, StrategyError> {
    if total_operations == 0 {
        return Err(StrategyError::MeasurementInconsistency(
            "no operations were executed".to_string(),
        ));
    }
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return Err(StrategyError::MeasurementInconsistency(format!(
            "elapsed time must be positive and finite, got {elapsed_seconds}s"
        )));
    }
    let rate = total_operations as f64 / elapsed_seconds;
    if !rate.is_finite() {
        return Err(StrategyError::MeasurementInconsistency(format!(
            "throughput is not finite ({total_operations} ops in {elapsed_seconds}s)"
        )));
    }
    Ok(rate)
}

/// Outcome of one strategy run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    name: String,
    elapsed_seconds: f64,
    iterations_executed: u64,
    total_operations: u64,
    throughput_ops_per_sec: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lanes: Vec<LaneGroup>,
    #[serde(default)]
    cycles: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip)]
    checksum: f64,
}

impl BenchmarkResult {
    /// Build a result from a timed multi-lane run.
    ///
    /// `lanes` is the exact work assignment; `checksum` is the sunk combination
    /// of lane terminal values.
    pub fn from_lanes(
        name: impl Into<String>,
        lanes: Vec<LaneGroup>,
        measurement: Measurement,
        checksum: f64,
    ) -> Result<Self, StrategyError> {
        let iterations: u64 = lanes.iter().map(|g| g.lanes * g.iterations).sum();
        let mut result = Self::new(name, measurement.seconds(), iterations)?;
        result.lanes = lanes;
        result.cycles = measurement.cycles;
        result.checksum = sink(checksum);
        if result.checksum == 0.0 {
            tracing::warn!(
                strategy = %result.name,
                checksum = result.checksum,
                "suspicious checksum; the compiler may have elided work"
            );
        }
        Ok(result)
    }

    /// Build a result from an elapsed time and executed iteration count
    pub fn new(
        name: impl Into<String>,
        elapsed_seconds: f64,
        iterations_executed: u64,
    ) -> Result<Self, StrategyError> {
        let total_operations = total_operations(iterations_executed);
        let throughput_ops_per_sec = throughput(total_operations, elapsed_seconds)?;
        Ok(Self {
            name: name.into(),
            elapsed_seconds,
            iterations_executed,
            total_operations,
            throughput_ops_per_sec,
            lanes: Vec::new(),
            cycles: 0,
            detail: None,
            checksum: 0.0,
        })
    }

    /// Attach a free-form note (instruction set, device name, ...)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Strategy name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timed interval in seconds (always > 0)
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Kernel iterations actually executed
    pub fn iterations_executed(&self) -> u64 {
        self.iterations_executed
    }

    /// `iterations_executed × 4`
    pub fn total_operations(&self) -> u64 {
        self.total_operations
    }

    /// `total_operations / elapsed_seconds`
    pub fn throughput_ops_per_sec(&self) -> f64 {
        self.throughput_ops_per_sec
    }

    /// Lane assignment in run-length form
    pub fn lanes(&self) -> &[LaneGroup] {
        &self.lanes
    }

    /// Total lanes that took part
    pub fn lane_count(&self) -> u64 {
        self.lanes.iter().map(|g| g.lanes).sum()
    }

    /// Cycle counter ticks across the timed region
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Optional note
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Combined lane terminal value
    pub fn checksum(&self) -> f64 {
        self.checksum
    }
}
