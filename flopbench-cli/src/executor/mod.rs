//! Benchmark Executor
//!
//! Runs the strategy suite and turns its outcomes into a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Capabilities + StrategyConfig
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Run each strategy once, progress bar
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report (metrics, speedups, peak)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Suite execution with progress reporting
//! - [`report`] - Report building from suite outcomes
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;

// Re-export public API
pub use execution::execute_suite;
pub use formatting::{format_capabilities, format_human_output};
pub use metadata::{SCHEMA_VERSION, build_report_meta, collect_system_info};
pub use report::build_report;
