//! Output Formatting
//!
//! Human-readable output formatting for benchmark reports.
//!
//! Generates terminal-friendly output with:
//! - One line per strategy with status icons (✓/✗/⊘)
//! - Throughput in GFLOPS or MFLOPS, elapsed time and speedup over scalar
//! - Lane assignment and cycle counts
//! - The best configuration found

use flopbench_core::Capabilities;
use flopbench_report::{
    Report, StrategyStatus, SystemInfo, format_speedup, format_throughput,
};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("FlopBench Results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  CPU: {} ({} cores)\n",
        report.meta.system.cpu, report.meta.system.cpu_cores
    ));
    output.push_str(&format!(
        "  Workload: {} iterations x {} ops per strategy\n\n",
        report.meta.workload.total_iterations, report.meta.workload.ops_per_iteration
    ));

    let width = report
        .results
        .iter()
        .map(|r| r.name.len())
        .chain(report.skipped.iter().map(|s| s.name.len()))
        .max()
        .unwrap_or(20);

    output.push_str(&format!(
        "    {:<width$}  {:>14}  {:>10}  {:>9}\n",
        "Strategy",
        "Throughput",
        "Time (s)",
        "Speedup",
        width = width
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for result in &report.results {
        let icon = match result.status {
            StrategyStatus::Passed => "✓",
            StrategyStatus::Failed => "✗",
        };

        match &result.metrics {
            Some(metrics) => {
                output.push_str(&format!(
                    "  {} {:<width$}  {:>14}  {:>10.3}  {:>9}\n",
                    icon,
                    result.name,
                    format_throughput(metrics.throughput_ops_sec),
                    metrics.elapsed_seconds,
                    format_speedup(result.relative_speedup),
                    width = width
                ));
                let lanes: u64 = metrics.lanes.iter().map(|g| g.lanes).sum();
                let mut line = format!(
                    "      ops: {}  lanes: {}",
                    metrics.total_operations, lanes
                );
                if let Some(detail) = &result.detail {
                    line.push_str(&format!("  [{}]", detail));
                }
                if metrics.cycles > 0 {
                    line.push_str(&format!("  cycles: {}", metrics.cycles));
                }
                output.push_str(&line);
                output.push('\n');
            }
            None => {
                output.push_str(&format!(
                    "  {} {:<width$}  {:>14}  {:>10}  {:>9}\n",
                    icon,
                    result.name,
                    "-",
                    "-",
                    format_speedup(None),
                    width = width
                ));
            }
        }

        if let Some(failure) = &result.failure {
            output.push_str(&format!(
                "      error ({}): {}\n",
                failure.kind, failure.message
            ));
        }
    }

    for skipped in &report.skipped {
        output.push_str(&format!(
            "  ⊘ {:<width$}  skipped: {}\n",
            skipped.name,
            skipped.reason,
            width = width
        ));
    }

    // Peak
    output.push_str("\nPeak Performance\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    match &report.summary.peak {
        Some(peak) => {
            output.push_str(&format!(
                "  Best configuration: {} at {:.2} GFLOPS ({} over scalar)\n",
                peak.name,
                peak.gflops,
                format_speedup(peak.speedup)
            ));
        }
        None => output.push_str("  No strategy produced a measurement\n"),
    }

    // Summary
    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Passed: {}  Failed: {}  Skipped: {}\n",
        report.summary.total_strategies,
        report.summary.passed,
        report.summary.failed,
        report.summary.skipped
    ));
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        report.summary.total_duration_ms
    ));

    output
}

/// Format host information and the capability descriptor
pub fn format_capabilities(system: &SystemInfo, caps: &Capabilities) -> String {
    let mut output = String::new();

    output.push_str("System\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!("  CPU:    {}\n", system.cpu));
    output.push_str(&format!("  Cores:  {}\n", system.cpu_cores));
    output.push_str(&format!("  Memory: {:.1} GB\n", system.memory_gb));
    output.push_str(&format!("  OS:     {} ({})\n", system.os, system.arch));

    output.push_str("\nCapabilities\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for (name, present) in [
        ("vector extension", caps.has_vector_ext),
        ("threading", caps.has_threading),
        ("gpu", caps.has_gpu),
        ("native arch build", caps.has_native_arch),
    ] {
        let icon = if present { "✓" } else { "✗" };
        output.push_str(&format!("  {} {}\n", icon, name));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::metadata::collect_system_info;
    use crate::executor::{build_report, build_report_meta};
    use flopbench_core::{BenchmarkResult, StrategyOutcome, SuiteReport};
    use flopbench_report::WorkloadInfo;

    fn report(outcomes: Vec<StrategyOutcome>) -> Report {
        let meta = build_report_meta(
            Capabilities::none(),
            WorkloadInfo {
                total_iterations: 100_000_000,
                ops_per_iteration: 4,
                threads: 1,
                gpu_workgroups: 256,
            },
        );
        build_report(&SuiteReport::from_outcomes(outcomes, vec![]), meta)
    }

    #[test]
    fn test_human_output_units() {
        let output = format_human_output(&report(vec![
            StrategyOutcome::Completed(BenchmarkResult::new("scalar", 2.0, 100_000_000).unwrap()),
            StrategyOutcome::Completed(
                BenchmarkResult::new("vectorized", 0.1, 100_000_000).unwrap(),
            ),
        ]));
        assert!(output.contains("200 MFLOPS"));
        assert!(output.contains("4.00 GFLOPS"));
        assert!(output.contains("20.00x"));
        assert!(output.contains("Best configuration: vectorized at 4.00 GFLOPS (20.00x over scalar)"));
    }

    #[test]
    fn test_speedup_without_baseline_is_na() {
        let output = format_human_output(&report(vec![StrategyOutcome::Completed(
            BenchmarkResult::new("vectorized", 0.1, 100_000_000).unwrap(),
        )]));
        assert!(output.contains("N/A"));
        assert!(!output.contains("1.00x"));
    }

    #[test]
    fn test_capabilities_listing() {
        let output = format_capabilities(&collect_system_info(), &Capabilities::none());
        assert!(output.contains("✗ gpu"));
        assert!(output.contains("Cores:"));
    }
}
