//! Workload Kernel
//!
//! The arithmetic recurrence every strategy drives:
//!
//! ```text
//! result ← a*b + result
//! a      ← result * 0.999999
//! b      ← a + 1.000001
//! ```
//!
//! Four floating-point operations per iteration (mul, add, mul, add). The
//! vectorized and GPU kernels fuse the first step into an FMA, which is still
//! counted as two operations.

use crate::error::StrategyError;
use std::hint::black_box;

/// Floating-point operations per kernel iteration
pub const OPS_PER_ITERATION: u64 = 4;

/// Multiplier applied to `result` when deriving the next `a`
pub const DECAY: f64 = 0.999_999;

/// Addend applied to `a` when deriving the next `b`
pub const INCREMENT: f64 = 1.000_001;

/// Iterations per strategy when nothing else is configured
pub const DEFAULT_ITERATIONS: u64 = 400_000_000;

/// Seed offset between consecutive lanes
pub const LANE_SEED_STEP: f64 = 0.1;

const SEED_A: f64 = 1.234_567_89;
const SEED_B: f64 = 9.876_543_21;

/// The fixed amount of work every strategy performs in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadSpec {
    total_iterations: u64,
}

impl WorkloadSpec {
    /// Create a workload of `total_iterations` kernel iterations
    pub fn new(total_iterations: u64) -> Result<Self, StrategyError> {
        if total_iterations == 0 {
            return Err(StrategyError::InvalidWorkload(
                "total_iterations must be at least 1".to_string(),
            ));
        }
        Ok(Self { total_iterations })
    }

    /// Total kernel iterations across all lanes
    pub fn total_iterations(&self) -> u64 {
        self.total_iterations
    }

    /// Operations the workload represents (`total_iterations × 4`)
    pub fn nominal_operations(&self) -> u64 {
        self.total_iterations.saturating_mul(OPS_PER_ITERATION)
    }
}

impl Default for WorkloadSpec {
    fn default() -> Self {
        Self {
            total_iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Recurrence state owned by exactly one lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneState {
    /// First multiplicand
    pub a: f64,
    /// Second multiplicand
    pub b: f64,
    /// Running accumulator
    pub result: f64,
}

impl LaneState {
    /// Seed state for lane `lane`, offset so lanes never compute identical values
    pub fn seeded(lane: usize) -> Self {
        let offset = LANE_SEED_STEP * lane as f64;
        Self {
            a: SEED_A + offset,
            b: SEED_B + offset,
            result: 0.0,
        }
    }

    /// Advance the recurrence by one iteration
    #[inline(always)]
    pub fn step(&mut self) {
        self.result = self.a * self.b + self.result;
        self.a = self.result * DECAY;
        self.b = self.a + INCREMENT;
    }

    /// Run `iterations` steps and return the terminal `result`.
    ///
    /// Both the seed state and the iteration count pass through `black_box`
    /// so the loop can be neither constant-folded nor shortened.
    #[inline(never)]
    pub fn run(self, iterations: u64) -> f64 {
        let mut state = black_box(self);
        let iterations = black_box(iterations);
        for _ in 0..iterations {
            state.step();
        }
        black_box(state.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(
            WorkloadSpec::new(0),
            Err(StrategyError::InvalidWorkload(_))
        ));
        let spec = WorkloadSpec::new(10).unwrap();
        assert_eq!(spec.total_iterations(), 10);
        assert_eq!(spec.nominal_operations(), 40);
    }

    #[test]
    fn test_step_matches_recurrence() {
        let mut state = LaneState::seeded(0);
        let expected_result = 1.234_567_89 * 9.876_543_21;
        state.step();
        assert!((state.result - expected_result).abs() < 1e-12);
        assert!((state.a - expected_result * DECAY).abs() < 1e-12);
        assert!((state.b - (state.a + INCREMENT)).abs() < 1e-12);
    }

    #[test]
    fn test_lanes_seeded_apart() {
        let lane0 = LaneState::seeded(0);
        let lane3 = LaneState::seeded(3);
        assert!((lane3.a - lane0.a - 0.3).abs() < 1e-12);
        assert!((lane3.b - lane0.b - 0.3).abs() < 1e-12);
        assert_eq!(lane3.result, 0.0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let first = LaneState::seeded(1).run(1_000);
        let second = LaneState::seeded(1).run(1_000);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(LaneState::seeded(1).run(0), 0.0);
    }
}
