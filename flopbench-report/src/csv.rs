//! CSV Output

use crate::report::{Report, StrategyStatus};

const HEADER: &str = "name,status,elapsed_seconds,iterations,total_operations,ops_per_sec,mflops,relative_speedup,detail,error";

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Generate a CSV report, one row per executed or skipped strategy.
///
/// Missing values are left empty.
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::from(HEADER);
    output.push('\n');

    for result in &report.results {
        let status = match result.status {
            StrategyStatus::Passed => "passed",
            StrategyStatus::Failed => "failed",
        };
        let (elapsed, iterations, ops, rate, mflops) = match &result.metrics {
            Some(m) => (
                format!("{:.9}", m.elapsed_seconds),
                m.iterations_executed.to_string(),
                m.total_operations.to_string(),
                format!("{:.0}", m.throughput_ops_sec),
                format!("{:.2}", m.mflops),
            ),
            None => Default::default(),
        };
        let speedup = result
            .relative_speedup
            .map(|s| format!("{:.4}", s))
            .unwrap_or_default();
        let detail = result.detail.as_deref().unwrap_or("");
        let error = result
            .failure
            .as_ref()
            .map(|f| f.message.as_str())
            .unwrap_or("");

        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            escape(&result.name),
            status,
            elapsed,
            iterations,
            ops,
            rate,
            mflops,
            speedup,
            escape(detail),
            escape(error)
        ));
    }

    for skipped in &report.skipped {
        output.push_str(&format!(
            "{},skipped,,,,,,,,{}\n",
            escape(&skipped.name),
            escape(&skipped.reason)
        ));
    }

    output
}
