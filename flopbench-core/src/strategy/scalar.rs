//! Scalar baseline: one thread, one lane, all iterations.

use super::{ExecutionStrategy, StrategyKind, run_single_lane};
use crate::aggregate::{BenchmarkResult, sink};
use crate::error::StrategyError;
use crate::kernel::{LaneState, WorkloadSpec};
use crate::measure::measure;
use crate::partition::LaneGroup;

/// Single-threaded scalar f64 recurrence
#[derive(Debug, Clone, Default)]
pub struct Scalar {
    pin_cpu: Option<usize>,
}

impl Scalar {
    /// Create the baseline strategy, optionally pinned to `pin_cpu`
    pub fn new(pin_cpu: Option<usize>) -> Self {
        Self { pin_cpu }
    }
}

impl ExecutionStrategy for Scalar {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Scalar
    }

    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
        let iterations = spec.total_iterations();
        let (terminal, elapsed) = run_single_lane(self.pin_cpu, || {
            measure(|| LaneState::seeded(0).run(iterations))
        });

        let lanes = vec![LaneGroup {
            lanes: 1,
            iterations,
        }];
        let result = BenchmarkResult::from_lanes(self.name(), lanes, elapsed, sink(terminal))?;
        Ok(result.with_detail("f64"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_executes_every_iteration() {
        let spec = WorkloadSpec::new(100_000).unwrap();
        let result = Scalar::default().run(&spec).unwrap();
        assert_eq!(result.name(), "scalar");
        assert_eq!(result.iterations_executed(), 100_000);
        assert_eq!(result.total_operations(), 400_000);
        assert!(result.elapsed_seconds() > 0.0);
        assert!(result.throughput_ops_per_sec().is_finite());
    }

    #[test]
    fn test_scalar_single_iteration() {
        let spec = WorkloadSpec::new(1).unwrap();
        // A single iteration may finish below timer resolution
        match Scalar::default().run(&spec) {
            Ok(result) => {
                assert_eq!(result.total_operations(), 4);
                assert_eq!(result.lane_count(), 1);
            }
            Err(e) => assert!(matches!(e, StrategyError::MeasurementInconsistency(_))),
        }
    }
}
