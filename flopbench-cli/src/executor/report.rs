//! Report Building
//!
//! Converts a [`SuiteReport`] into the serializable [`Report`] consumed by
//! every renderer.
//!
//! ```text
//!   SuiteReport (outcomes + skipped)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │ ThroughputMetrics   │  elapsed, ops, MFLOPS/GFLOPS, lanes
//!   │ relative speedup    │  vs. scalar, absent without a baseline
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │      Report         │  Ready for JSON/CSV/GitHub/human output
//!   └─────────────────────┘
//! ```

use flopbench_core::{BenchmarkResult, StrategyKind, StrategyOutcome, SuiteReport};
use flopbench_report::{
    FailureInfo, PeakInfo, Report, ReportMeta, ReportSummary, SkippedEntry, StrategyReportResult,
    StrategyStatus, ThroughputMetrics, gflops, mflops,
};

/// Build a complete Report from a suite run
pub fn build_report(suite: &SuiteReport, meta: ReportMeta) -> Report {
    let results: Vec<StrategyReportResult> = suite
        .entries()
        .iter()
        .map(|outcome| strategy_entry(suite, outcome))
        .collect();

    let skipped: Vec<SkippedEntry> = suite
        .skipped()
        .iter()
        .map(|s| SkippedEntry {
            name: s.name.clone(),
            reason: s.reason.clone(),
        })
        .collect();

    let passed = results
        .iter()
        .filter(|r| r.status == StrategyStatus::Passed)
        .count();
    let failed = results.len() - passed;

    let peak = suite.peak().map(|best| PeakInfo {
        name: best.name().to_string(),
        gflops: gflops(best.throughput_ops_per_sec()),
        speedup: suite.relative_speedup(best.name()).ok(),
    });

    let summary = ReportSummary {
        total_strategies: results.len() + skipped.len(),
        passed,
        failed,
        skipped: skipped.len(),
        baseline_completed: suite.is_success(),
        peak,
        total_duration_ms: suite.wall_time().as_secs_f64() * 1000.0,
    };

    Report {
        meta,
        results,
        skipped,
        summary,
    }
}

fn strategy_entry(suite: &SuiteReport, outcome: &StrategyOutcome) -> StrategyReportResult {
    let name = outcome.name().to_string();
    let description = name
        .parse::<StrategyKind>()
        .map(|kind| kind.description().to_string())
        .unwrap_or_default();

    match outcome {
        StrategyOutcome::Completed(result) => StrategyReportResult {
            relative_speedup: suite.relative_speedup(&name).ok(),
            name,
            description,
            status: StrategyStatus::Passed,
            metrics: Some(metrics(result)),
            detail: result.detail().map(str::to_string),
            failure: None,
        },
        StrategyOutcome::Failed { error, .. } => StrategyReportResult {
            name,
            description,
            status: StrategyStatus::Failed,
            metrics: None,
            relative_speedup: None,
            detail: None,
            failure: Some(FailureInfo {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        },
    }
}

fn metrics(result: &BenchmarkResult) -> ThroughputMetrics {
    let rate = result.throughput_ops_per_sec();
    ThroughputMetrics {
        elapsed_seconds: result.elapsed_seconds(),
        iterations_executed: result.iterations_executed(),
        total_operations: result.total_operations(),
        throughput_ops_sec: rate,
        mflops: mflops(rate),
        gflops: gflops(rate),
        cycles: result.cycles(),
        lanes: result.lanes().to_vec(),
    }
}
