//! Report Data Structures

use chrono::{DateTime, Utc};
use flopbench_core::{Capabilities, LaneGroup};
use serde::{Deserialize, Serialize};

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// Executed strategies in execution order
    pub results: Vec<StrategyReportResult>,
    /// Strategies that never ran
    pub skipped: Vec<SkippedEntry>,
    /// Totals and peak configuration
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// FlopBench version
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Current commit, if run inside a git checkout
    pub git_commit: Option<String>,
    /// Current branch, if run inside a git checkout
    pub git_branch: Option<String>,
    /// Host description
    pub system: SystemInfo,
    /// Capability descriptor after configuration
    pub capabilities: Capabilities,
    /// Workload every strategy executed
    pub workload: WorkloadInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu: String,
    /// Logical cores
    pub cpu_cores: u32,
    /// Total memory
    pub memory_gb: f64,
}

/// Workload parameters captured in report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadInfo {
    /// Iterations per strategy
    pub total_iterations: u64,
    /// Operations counted per iteration
    pub ops_per_iteration: u64,
    /// Worker threads for multi-thread strategies
    pub threads: usize,
    /// GPU workgroups dispatched
    pub gpu_workgroups: u32,
}

/// Executed strategy in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReportResult {
    /// Strategy name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Passed or failed
    pub status: StrategyStatus,
    /// Measurement, when the strategy passed
    pub metrics: Option<ThroughputMetrics>,
    /// Throughput relative to the scalar baseline; absent without a baseline
    pub relative_speedup: Option<f64>,
    /// Instruction set, thread count or device
    pub detail: Option<String>,
    /// Failure details, when the strategy failed
    pub failure: Option<FailureInfo>,
}

/// Strategy execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    /// Produced a valid measurement
    Passed,
    /// Produced no measurement
    Failed,
}

/// Throughput measurement for one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Timed interval in seconds
    pub elapsed_seconds: f64,
    /// Kernel iterations executed
    pub iterations_executed: u64,
    /// Operations executed
    pub total_operations: u64,
    /// Operations per second
    pub throughput_ops_sec: f64,
    /// Millions of operations per second
    pub mflops: f64,
    /// Billions of operations per second
    pub gflops: f64,
    /// Cycle counter ticks across the timed region (0 without a counter)
    pub cycles: u64,
    /// Lane assignment in run-length form
    pub lanes: Vec<LaneGroup>,
}

/// Failure information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    /// Error category (e.g. `device-operation-failed`)
    pub kind: String,
    /// Error message
    pub message: String,
}

/// Strategy excluded before running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Strategy name
    pub name: String,
    /// Why it was skipped
    pub reason: String,
}

/// Highest-throughput configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakInfo {
    /// Strategy name
    pub name: String,
    /// Peak throughput
    pub gflops: f64,
    /// Speedup over the scalar baseline, if one completed
    pub speedup: Option<f64>,
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Strategies executed or skipped
    pub total_strategies: usize,
    /// Strategies that produced a measurement
    pub passed: usize,
    /// Strategies that failed
    pub failed: usize,
    /// Strategies never run
    pub skipped: usize,
    /// Whether the scalar baseline completed
    pub baseline_completed: bool,
    /// Best configuration
    pub peak: Option<PeakInfo>,
    /// Wall time of the run
    pub total_duration_ms: f64,
}

#[cfg(test)]
pub(crate) fn sample_report() -> Report {
    Report {
        meta: ReportMeta {
            schema_version: 1,
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
            git_commit: None,
            git_branch: None,
            system: SystemInfo {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                cpu: "test".to_string(),
                cpu_cores: 4,
                memory_gb: 8.0,
            },
            capabilities: Capabilities::none(),
            workload: WorkloadInfo {
                total_iterations: 100_000_000,
                ops_per_iteration: 4,
                threads: 4,
                gpu_workgroups: 256,
            },
        },
        results: vec![
            StrategyReportResult {
                name: "scalar".to_string(),
                description: "single thread, scalar f64".to_string(),
                status: StrategyStatus::Passed,
                metrics: Some(ThroughputMetrics {
                    elapsed_seconds: 2.0,
                    iterations_executed: 100_000_000,
                    total_operations: 400_000_000,
                    throughput_ops_sec: 200_000_000.0,
                    mflops: 200.0,
                    gflops: 0.2,
                    cycles: 0,
                    lanes: vec![LaneGroup {
                        lanes: 1,
                        iterations: 100_000_000,
                    }],
                }),
                relative_speedup: Some(1.0),
                detail: Some("f64".to_string()),
                failure: None,
            },
            StrategyReportResult {
                name: "multi-thread-scalar".to_string(),
                description: "all worker threads, scalar f64".to_string(),
                status: StrategyStatus::Failed,
                metrics: None,
                relative_speedup: None,
                detail: None,
                failure: Some(FailureInfo {
                    kind: "panic".to_string(),
                    message: "worker, \"exploded\"".to_string(),
                }),
            },
        ],
        skipped: vec![SkippedEntry {
            name: "gpu-offload".to_string(),
            reason: "GPU backend unavailable".to_string(),
        }],
        summary: ReportSummary {
            total_strategies: 3,
            passed: 1,
            failed: 1,
            skipped: 1,
            baseline_completed: true,
            peak: Some(PeakInfo {
                name: "scalar".to_string(),
                gflops: 0.2,
                speedup: Some(1.0),
            }),
            total_duration_ms: 2100.0,
        },
    }
}
