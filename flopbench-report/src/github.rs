//! GitHub Actions Summary Output
//!
//! Markdown suitable for appending to `$GITHUB_STEP_SUMMARY`.

use crate::report::{Report, StrategyStatus};
use crate::units::{format_speedup, format_throughput};

/// Generate a Markdown summary table
pub fn generate_github_summary(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("## FlopBench Results\n\n");
    output.push_str(&format!(
        "**CPU:** {} ({} cores) · **Iterations:** {} per strategy\n\n",
        report.meta.system.cpu, report.meta.system.cpu_cores, report.meta.workload.total_iterations
    ));

    output.push_str("| Strategy | Status | Throughput | Time (s) | Speedup |\n");
    output.push_str("|----------|--------|------------|----------|---------|\n");

    for result in &report.results {
        let (icon, throughput, elapsed) = match (&result.status, &result.metrics) {
            (StrategyStatus::Passed, Some(m)) => (
                "✅",
                format_throughput(m.throughput_ops_sec),
                format!("{:.3}", m.elapsed_seconds),
            ),
            _ => ("❌", "-".to_string(), "-".to_string()),
        };
        output.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            result.name,
            icon,
            throughput,
            elapsed,
            format_speedup(result.relative_speedup)
        ));
    }

    for skipped in &report.skipped {
        output.push_str(&format!(
            "| `{}` | ⏭️ | - | - | N/A |\n",
            skipped.name
        ));
    }

    let failures: Vec<_> = report
        .results
        .iter()
        .filter_map(|r| r.failure.as_ref().map(|f| (&r.name, f)))
        .collect();
    if !failures.is_empty() {
        output.push_str("\n### Failures\n\n");
        for (name, failure) in failures {
            output.push_str(&format!(
                "- `{}` ({}): {}\n",
                name, failure.kind, failure.message
            ));
        }
    }

    if let Some(peak) = &report.summary.peak {
        output.push_str(&format!(
            "\n**Peak:** `{}` at {:.2} GFLOPS ({} over baseline)\n",
            peak.name,
            peak.gflops,
            format_speedup(peak.speedup)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_report;

    #[test]
    fn test_summary_table() {
        let md = generate_github_summary(&sample_report());
        assert!(md.contains("| `scalar` | ✅ | 200 MFLOPS | 2.000 | 1.00x |"));
        assert!(md.contains("| `multi-thread-scalar` | ❌ | - | - | N/A |"));
        assert!(md.contains("| `gpu-offload` | ⏭️ | - | - | N/A |"));
        assert!(md.contains("### Failures"));
        assert!(md.contains("**Peak:** `scalar` at 0.20 GFLOPS (1.00x over baseline)"));
    }
}
