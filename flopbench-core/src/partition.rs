//! Exact iteration partitioning
//!
//! `total` iterations over `lanes` lanes: every lane gets `total / lanes`,
//! and the first `total % lanes` lanes get one more. Nothing is dropped.

use crate::error::StrategyError;
use crate::simd::VECTOR_WIDTH;
use serde::{Deserialize, Serialize};

/// Iteration assignment across a fixed number of lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    lanes: usize,
    base: u64,
    extra: usize,
}

/// Run-length summary of lanes sharing the same iteration count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneGroup {
    /// Number of lanes in the group
    pub lanes: u64,
    /// Iterations each lane in the group executed
    pub iterations: u64,
}

/// A per-lane share split into packed vector steps and a scalar tail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSplit {
    /// Vector steps, each advancing `VECTOR_WIDTH` packed sub-lanes once
    pub steps: u64,
    /// Leftover iterations run on a scalar tail lane
    pub tail: u64,
}

impl VectorSplit {
    /// Split a share of iterations into packed steps plus tail
    pub fn of(share: u64) -> Self {
        let width = VECTOR_WIDTH as u64;
        Self {
            steps: share / width,
            tail: share % width,
        }
    }

    /// Iterations the split executes in total
    pub fn iterations(&self) -> u64 {
        self.steps * VECTOR_WIDTH as u64 + self.tail
    }
}

impl Partition {
    /// Partition `total` iterations across `lanes` lanes
    pub fn new(total: u64, lanes: usize) -> Result<Self, StrategyError> {
        if lanes == 0 {
            return Err(StrategyError::InvalidWorkload(
                "cannot partition across zero lanes".to_string(),
            ));
        }
        let n = lanes as u64;
        Ok(Self {
            lanes,
            base: total / n,
            extra: (total % n) as usize,
        })
    }

    /// Number of lanes
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Iterations every lane receives before remainder correction
    pub fn base(&self) -> u64 {
        self.base
    }

    /// How many leading lanes receive one extra iteration
    pub fn extra(&self) -> usize {
        self.extra
    }

    /// Iterations assigned to `lane`
    pub fn iterations_for(&self, lane: usize) -> u64 {
        if lane < self.extra {
            self.base + 1
        } else {
            self.base
        }
    }

    /// Sum of all lane shares (always equals the partitioned total)
    pub fn total(&self) -> u64 {
        self.base * self.lanes as u64 + self.extra as u64
    }

    /// Run-length form of the lane shares, omitting groups with no lanes
    pub fn groups(&self) -> Vec<LaneGroup> {
        let mut groups = Vec::with_capacity(2);
        if self.extra > 0 {
            groups.push(LaneGroup {
                lanes: self.extra as u64,
                iterations: self.base + 1,
            });
        }
        let remaining = (self.lanes - self.extra) as u64;
        if remaining > 0 {
            groups.push(LaneGroup {
                lanes: remaining,
                iterations: self.base,
            });
        }
        groups
    }
}
