//! Report output tests
//!
//! Drive the runner pipeline the binary uses and check what lands on disk.

use flopbench::{
    Capabilities, OutputFormat, RunSettings, SCHEMA_VERSION, StrategyConfig, StrategyKind,
    WorkloadSpec, build_suite, render_report, run_suite, write_outputs,
};
use std::path::PathBuf;

fn scalar_only(
    format: OutputFormat,
    output: Option<PathBuf>,
    save_json: Option<PathBuf>,
) -> RunSettings {
    RunSettings {
        spec: WorkloadSpec::new(25_000).unwrap(),
        capabilities: Capabilities::detect().restrict(false, false, false),
        strategy: StrategyConfig {
            threads: Some(2),
            ..Default::default()
        },
        kinds: StrategyKind::ALL.to_vec(),
        format,
        output,
        save_json,
    }
}

#[test]
fn test_json_report_is_machine_readable() {
    let settings = scalar_only(OutputFormat::Json, None, None);
    let report = run_suite(&build_suite(&settings), &settings, false);
    let json = render_report(&report, OutputFormat::Json).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["meta"]["schema_version"], SCHEMA_VERSION);
    assert_eq!(value["results"][0]["name"], "scalar");
    assert_eq!(value["results"][0]["metrics"]["total_operations"], 100_000);
    assert_eq!(value["summary"]["baseline_completed"], true);
    assert_eq!(value["skipped"].as_array().unwrap().len(), 4);
    assert_eq!(value["skipped"][0]["reason"], flopbench::DISABLED_BY_CONFIG);
}

#[test]
fn test_outputs_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("out").join("report.csv");
    let json_path = dir.path().join("results").join("report.json");
    let settings = scalar_only(
        OutputFormat::Csv,
        Some(csv_path.clone()),
        Some(json_path.clone()),
    );

    let report = run_suite(&build_suite(&settings), &settings, false);
    write_outputs(&settings, &report).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.lines().any(|line| line.starts_with("scalar,")));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(saved["results"][0]["name"], "scalar");
    assert_eq!(saved["results"][0]["relative_speedup"], 1.0);
}
