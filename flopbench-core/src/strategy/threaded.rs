//! Multi-thread strategies.
//!
//! A rayon pool of exactly N threads is built at construction. The timed
//! region is one `broadcast`: every pool thread runs its lane and returns its
//! terminal value, and the broadcast return is the join barrier. Slots are
//! summed on the coordinating thread after the timer stops, so the hot path
//! has no lock or atomic.

use super::vectorized::{run_vector_share, vector_lane_groups};
use super::{ExecutionStrategy, StrategyKind};
use crate::aggregate::{BenchmarkResult, combine, sink};
use crate::error::StrategyError;
use crate::kernel::{LaneState, WorkloadSpec};
use crate::measure::measure;
use crate::partition::{LaneGroup, Partition, VectorSplit};
use crate::simd::VectorUnit;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Bounded worker pool shared by both multi-thread strategies
struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
}

impl WorkerPool {
    fn build(kind: StrategyKind, threads: usize) -> Result<Self, StrategyError> {
        if threads == 0 {
            return Err(StrategyError::InvalidWorkload(
                "worker thread count must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("flopbench-worker-{i}"))
            .build()
            .map_err(|e| StrategyError::unavailable(kind.name(), e.to_string()))?;
        tracing::debug!(strategy = kind.name(), threads, "worker pool ready");
        Ok(Self { pool, threads })
    }

    /// Run `lane(index, share)` once per pool thread and return the per-thread slots
    fn run_lanes<F>(&self, partition: &Partition, lane: F) -> Vec<f64>
    where
        F: Fn(usize, u64) -> f64 + Sync,
    {
        self.pool.broadcast(|ctx| {
            let index = ctx.index();
            lane(index, partition.iterations_for(index))
        })
    }
}

/// N threads, one scalar lane each
pub struct MultiThreadScalar {
    workers: WorkerPool,
}

impl MultiThreadScalar {
    /// Build a pool of exactly `threads` workers
    pub fn new(threads: usize) -> Result<Self, StrategyError> {
        Ok(Self {
            workers: WorkerPool::build(StrategyKind::MultiThreadScalar, threads)?,
        })
    }

    /// Worker threads in the pool
    pub fn threads(&self) -> usize {
        self.workers.threads
    }
}

impl ExecutionStrategy for MultiThreadScalar {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiThreadScalar
    }

    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
        let partition = Partition::new(spec.total_iterations(), self.workers.threads)?;
        tracing::debug!(
            threads = partition.lanes(),
            base = partition.base(),
            extra = partition.extra(),
            "multi-thread scalar plan"
        );

        let (slots, elapsed) = measure(|| {
            self.workers
                .run_lanes(&partition, |index, share| LaneState::seeded(index).run(share))
        });

        let result = BenchmarkResult::from_lanes(
            self.name(),
            partition.groups(),
            elapsed,
            sink(combine(slots)),
        )?;
        Ok(result.with_detail(format!("{} threads", self.workers.threads)))
    }
}

/// N threads, packed sub-lanes plus scalar tail each
pub struct MultiThreadVectorized {
    workers: WorkerPool,
    unit: VectorUnit,
}

impl MultiThreadVectorized {
    /// Build a pool of exactly `threads` workers; fails without a packed extension
    pub fn new(threads: usize) -> Result<Self, StrategyError> {
        let unit = VectorUnit::detect().ok_or_else(|| {
            StrategyError::unavailable(
                StrategyKind::MultiThreadVectorized.name(),
                "no AVX2+FMA or NEON support on this CPU",
            )
        })?;
        Ok(Self {
            workers: WorkerPool::build(StrategyKind::MultiThreadVectorized, threads)?,
            unit,
        })
    }

    /// Worker threads in the pool
    pub fn threads(&self) -> usize {
        self.workers.threads
    }
}

impl ExecutionStrategy for MultiThreadVectorized {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiThreadVectorized
    }

    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
        let partition = Partition::new(spec.total_iterations(), self.workers.threads)?;
        tracing::debug!(
            threads = partition.lanes(),
            base = partition.base(),
            extra = partition.extra(),
            "multi-thread vectorized plan"
        );

        let unit = self.unit;
        let (slots, elapsed) = measure(|| {
            self.workers
                .run_lanes(&partition, |index, share| run_vector_share(&unit, index, share))
        });

        let lanes: Vec<LaneGroup> = partition
            .groups()
            .into_iter()
            .flat_map(|group| vector_lane_groups(VectorSplit::of(group.iterations), group.lanes))
            .collect();
        let result =
            BenchmarkResult::from_lanes(self.name(), lanes, elapsed, sink(combine(slots)))?;
        Ok(result.with_detail(format!(
            "{} threads, {}",
            self.workers.threads,
            self.unit.isa()
        )))
    }
}
