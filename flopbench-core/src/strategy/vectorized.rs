//! Single-thread packed strategy.
//!
//! `total / 4` vector steps advance four packed sub-lanes; the `total % 4`
//! leftover iterations run on a scalar tail lane so no work is dropped.

use super::{ExecutionStrategy, StrategyKind, run_single_lane};
use crate::aggregate::{BenchmarkResult, combine, sink};
use crate::error::StrategyError;
use crate::kernel::{LaneState, WorkloadSpec};
use crate::measure::measure;
use crate::partition::{LaneGroup, VectorSplit};
use crate::simd::{PackedLanes, VECTOR_WIDTH, VectorUnit};

/// Run one thread's share as packed steps plus scalar tail; returns the lane sum
#[inline(always)]
pub(super) fn run_vector_share(unit: &VectorUnit, thread: usize, share: u64) -> f64 {
    let split = VectorSplit::of(share);
    let packed = unit.run(PackedLanes::seeded(thread), split.steps);
    let tail = LaneState::seeded(thread).run(split.tail);
    combine(packed) + tail
}

/// Lane groups for `threads` threads each running `split`
pub(super) fn vector_lane_groups(split: VectorSplit, threads: u64) -> Vec<LaneGroup> {
    let mut groups = vec![LaneGroup {
        lanes: threads * VECTOR_WIDTH as u64,
        iterations: split.steps,
    }];
    if split.tail > 0 {
        groups.push(LaneGroup {
            lanes: threads,
            iterations: split.tail,
        });
    }
    groups
}

/// Single-threaded 4-wide packed recurrence
#[derive(Debug, Clone)]
pub struct Vectorized {
    unit: VectorUnit,
    pin_cpu: Option<usize>,
}

impl Vectorized {
    /// Create the strategy; fails when no packed extension is present
    pub fn new(pin_cpu: Option<usize>) -> Result<Self, StrategyError> {
        let unit = VectorUnit::detect().ok_or_else(|| {
            StrategyError::unavailable(
                StrategyKind::Vectorized.name(),
                "no AVX2+FMA or NEON support on this CPU",
            )
        })?;
        Ok(Self { unit, pin_cpu })
    }
}

impl ExecutionStrategy for Vectorized {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Vectorized
    }

    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
        let total = spec.total_iterations();
        let split = VectorSplit::of(total);
        tracing::debug!(steps = split.steps, tail = split.tail, "vectorized plan");

        let unit = self.unit;
        let (terminal, elapsed) =
            run_single_lane(self.pin_cpu, || measure(|| run_vector_share(&unit, 0, total)));

        let result = BenchmarkResult::from_lanes(
            self.name(),
            vector_lane_groups(split, 1),
            elapsed,
            sink(terminal),
        )?;
        Ok(result.with_detail(self.unit.isa().name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorized_counts_tail() {
        let strategy = match Vectorized::new(None) {
            Ok(s) => s,
            Err(e) => {
                assert!(e.is_capability_unavailable());
                return;
            }
        };
        let spec = WorkloadSpec::new(100_003).unwrap();
        let result = strategy.run(&spec).unwrap();
        assert_eq!(result.iterations_executed(), 100_003);
        assert_eq!(result.total_operations(), 400_012);
        assert_eq!(result.lane_count(), 5);
        assert!(result.detail().is_some());
    }

    #[test]
    fn test_lane_groups_without_tail() {
        let groups = vector_lane_groups(VectorSplit::of(400), 2);
        assert_eq!(
            groups,
            vec![LaneGroup {
                lanes: 8,
                iterations: 100
            }]
        );
    }

    #[test]
    fn test_vector_share_is_deterministic() {
        let Some(unit) = VectorUnit::detect() else {
            return;
        };
        let a = run_vector_share(&unit, 2, 1_003);
        let b = run_vector_share(&unit, 2, 1_003);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
