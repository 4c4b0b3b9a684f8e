//! Suite Execution
//!
//! Drives a [`BenchmarkSuite`] behind an `indicatif` progress bar. The suite
//! already isolates panics per strategy; this layer only reports progress.
//!
//! ```text
//! BenchmarkSuite ──run_with──► SuiteEvent::Started  ──► bar message
//!                              SuiteEvent::Finished ──► bar.inc(1)
//!                              SuiteEvent::Skipped  ──► bar.inc(1)
//!                     │
//!                     ▼
//!                SuiteReport
//! ```

use flopbench_core::{BenchmarkSuite, StrategyOutcome, SuiteEvent, SuiteReport, WorkloadSpec};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Execute every scheduled strategy once, showing progress on stderr
pub fn execute_suite(suite: &BenchmarkSuite, spec: &WorkloadSpec, show_progress: bool) -> SuiteReport {
    let pb = ProgressBar::new(suite.len() as u64);
    if !show_progress {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let report = suite.run_with(spec, |event| match event {
        SuiteEvent::Started { name, .. } => {
            pb.set_message(name.to_string());
        }
        SuiteEvent::Finished(outcome) => {
            if let StrategyOutcome::Failed { name, error } = outcome {
                pb.println(format!("  ✗ {}: {}", name, error));
            }
            pb.inc(1);
        }
        SuiteEvent::Skipped(skipped) => {
            pb.println(format!("  ⊘ {}: {}", skipped.name, skipped.reason));
            pb.inc(1);
        }
    });

    pb.finish_with_message("Complete");
    report
}
