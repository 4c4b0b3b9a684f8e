#![warn(missing_docs)]
//! FlopBench Report - Reporting
//!
//! Generates various output formats from one [`Report`]:
//! - JSON (machine-readable)
//! - GitHub Summary (Markdown for $GITHUB_STEP_SUMMARY)
//! - CSV (spreadsheet-compatible)
//!
//! Human-readable terminal output lives in the CLI and uses the unit
//! helpers exported here.

mod csv;
mod github;
mod json;
mod report;
mod units;

pub use csv::generate_csv_report;
pub use github::generate_github_summary;
pub use json::generate_json_report;
pub use report::{
    FailureInfo, PeakInfo, Report, ReportMeta, ReportSummary, SkippedEntry, StrategyReportResult,
    StrategyStatus, SystemInfo, ThroughputMetrics, WorkloadInfo,
};
pub use units::{format_duration, format_speedup, format_throughput, gflops, mflops};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Markdown for GitHub Actions
    GithubSummary,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "github" | "github-summary" => Ok(OutputFormat::GithubSummary),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl OutputFormat {
    /// File extension used when writing this format to disk
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::GithubSummary => "md",
            OutputFormat::Csv => "csv",
            OutputFormat::Human => "txt",
        }
    }
}
