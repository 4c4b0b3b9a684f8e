#![warn(missing_docs)]
//! FlopBench CLI Library
//!
//! This module provides the command-line runner behind the `flopbench`
//! binary: configuration discovery, strategy selection, progress display,
//! report rendering and the process exit contract.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = flopbench_cli::run() {
//!         eprintln!("Error: {e:#}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;

pub use config::*;
pub use executor::{
    SCHEMA_VERSION, build_report, build_report_meta, collect_system_info, execute_suite,
    format_capabilities, format_human_output,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use flopbench_core::{
    BenchmarkSuite, Capabilities, OPS_PER_ITERATION, PlanStatus, StrategyConfig, StrategyKind,
    WorkloadSpec,
};
use flopbench_report::{
    OutputFormat, Report, WorkloadInfo, generate_csv_report, generate_github_summary,
    generate_json_report,
};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// FlopBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "flopbench")]
#[command(author, version, about = "FlopBench - floating-point throughput across execution modes")]
pub struct Cli {
    /// Optional subcommand (Run, List, Caps, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter strategies by regex pattern (scalar always runs)
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Kernel iterations every strategy executes
    #[arg(long, global = true)]
    pub iterations: Option<u64>,

    /// Worker threads for multi-thread strategies (0 = detected core count)
    #[arg(long, short = 'j', global = true)]
    pub threads: Option<usize>,

    /// GPU workgroups to dispatch (global work size = workgroups x 256)
    #[arg(long, global = true)]
    pub gpu_workgroups: Option<u32>,

    /// Pin single-lane strategies to this CPU
    #[arg(long, global = true)]
    pub pin_cpu: Option<usize>,

    /// Disable vectorized strategies
    #[arg(long, global = true)]
    pub no_simd: bool,

    /// Disable multi-thread strategies
    #[arg(long, global = true)]
    pub no_threads: bool,

    /// Disable the GPU strategy
    #[arg(long, global = true)]
    pub no_gpu: bool,

    /// Output format: human, json, github-summary, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Also save the JSON report to <output directory>/report.json
    #[arg(long, global = true)]
    pub save_json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run strategies (default)
    Run {
        /// Filter strategies by regex pattern (scalar always runs)
        filter: Option<String>,
    },
    /// Show which strategies would run and why others would not
    List,
    /// Show system information and detected capabilities
    Caps,
    /// Write a default flopbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Everything a run needs, resolved from flopbench.toml and CLI overrides
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Workload every strategy executes
    pub spec: WorkloadSpec,
    /// Capability descriptor after configuration
    pub capabilities: Capabilities,
    /// Strategy constructor knobs
    pub strategy: StrategyConfig,
    /// Strategies selected by the filter, in canonical order
    pub kinds: Vec<StrategyKind>,
    /// Report format
    pub format: OutputFormat,
    /// Report destination (stdout when `None`)
    pub output: Option<PathBuf>,
    /// Where to save the JSON report, if requested
    pub save_json: Option<PathBuf>,
}

impl RunSettings {
    /// Layer flopbench.toml defaults, then CLI overrides
    pub fn resolve(cli: &Cli, config: &FlopConfig, filter: &str) -> anyhow::Result<Self> {
        let iterations = cli.iterations.unwrap_or(config.workload.iterations);
        let spec = WorkloadSpec::new(iterations)?;

        let capabilities = Capabilities::detect().restrict(
            config.capabilities.simd && !cli.no_simd,
            config.capabilities.threads && !cli.no_threads,
            config.capabilities.gpu && !cli.no_gpu,
        );

        let threads = cli.threads.unwrap_or(config.runner.threads);
        let mut gpu = config.gpu;
        if let Some(workgroups) = cli.gpu_workgroups {
            gpu.workgroups = workgroups;
        }
        let strategy = StrategyConfig {
            threads: (threads > 0).then_some(threads),
            pin_cpu: cli.pin_cpu.or(config.runner.pin_cpu),
            gpu,
        };

        let format_name = cli.format.as_deref().unwrap_or(&config.output.format);
        let format: OutputFormat = format_name.parse().map_err(anyhow::Error::msg)?;

        let save_json = (cli.save_json || config.output.save_json)
            .then(|| Path::new(&config.output.directory).join("report.json"));

        Ok(Self {
            spec,
            capabilities,
            strategy,
            kinds: select_strategies(filter)?,
            format,
            output: cli.output.clone(),
            save_json,
        })
    }

    /// Workload parameters recorded in report metadata
    pub fn workload_info(&self) -> WorkloadInfo {
        WorkloadInfo {
            total_iterations: self.spec.total_iterations(),
            ops_per_iteration: OPS_PER_ITERATION,
            threads: self.strategy.worker_threads(),
            gpu_workgroups: self.strategy.gpu.workgroups,
        }
    }
}

/// Strategies whose names match `filter`, plus the scalar baseline
pub fn select_strategies(filter: &str) -> anyhow::Result<Vec<StrategyKind>> {
    let re = Regex::new(filter).with_context(|| format!("invalid filter pattern '{}'", filter))?;
    Ok(StrategyKind::ALL
        .into_iter()
        .filter(|kind| kind.is_baseline() || re.is_match(kind.name()))
        .collect())
}

/// Run the FlopBench CLI with the process arguments.
/// This is the main entry point for the `flopbench` binary.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
/// Exits the process with status 1 when the scalar baseline does not complete.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the FlopBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        "flopbench=debug"
    } else {
        "flopbench=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    // Discover flopbench.toml configuration (CLI flags override)
    let config = FlopConfig::discover().unwrap_or_default();

    match &cli.command {
        Some(Commands::Init { force }) => init_config(*force),
        Some(Commands::List) => {
            let settings = RunSettings::resolve(&cli, &config, &cli.filter)?;
            list_strategies(&settings);
            Ok(())
        }
        Some(Commands::Caps) => {
            let settings = RunSettings::resolve(&cli, &config, &cli.filter)?;
            print!(
                "{}",
                format_capabilities(&collect_system_info(), &settings.capabilities)
            );
            Ok(())
        }
        Some(Commands::Run { filter }) => {
            let filter = filter.as_deref().unwrap_or(&cli.filter);
            let settings = RunSettings::resolve(&cli, &config, filter)?;
            run_strategies(&settings)
        }
        None => {
            let settings = RunSettings::resolve(&cli, &config, &cli.filter)?;
            run_strategies(&settings)
        }
    }
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::write(path, FlopConfig::default_toml())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn list_strategies(settings: &RunSettings) {
    println!("FlopBench Plan:");

    let plan = BenchmarkSuite::plan(&settings.capabilities, &settings.kinds);
    let mut runnable = 0;
    for entry in &plan {
        match &entry.status {
            PlanStatus::Ready => {
                println!("├── {} ({})", entry.kind, entry.kind.description());
                runnable += 1;
            }
            PlanStatus::Skipped(reason) => {
                println!("├── {} ({})", entry.kind, entry.kind.description());
                println!("│   └── skipped: {}", reason);
            }
        }
    }

    println!("{} of {} strategies runnable.", runnable, plan.len());
}

/// Construct every selected strategy the capabilities allow
pub fn build_suite(settings: &RunSettings) -> BenchmarkSuite {
    BenchmarkSuite::new(&settings.capabilities, &settings.kinds, &settings.strategy)
}

/// Run a constructed suite and build its report
pub fn run_suite(suite: &BenchmarkSuite, settings: &RunSettings, show_progress: bool) -> Report {
    let suite_report = execute_suite(suite, &settings.spec, show_progress);
    let meta = build_report_meta(settings.capabilities, settings.workload_info());
    build_report(&suite_report, meta)
}

/// Render a report in `format`
pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::GithubSummary => generate_github_summary(report),
        OutputFormat::Csv => generate_csv_report(report),
        OutputFormat::Human => format_human_output(report),
    })
}

/// Write the rendered report to its destination, plus the JSON copy if requested
pub fn write_outputs(settings: &RunSettings, report: &Report) -> anyhow::Result<()> {
    let output = render_report(report, settings.format)?;

    if let Some(ref path) = settings.output {
        write_file(path, &output)?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if let Some(ref path) = settings.save_json {
        write_file(path, &generate_json_report(report)?)?;
        eprintln!("JSON report saved to: {}", path.display());
    }

    Ok(())
}

/// One-line summary of what is about to run; skipped strategies are not counted
fn run_header(suite: &BenchmarkSuite, settings: &RunSettings) -> String {
    format!(
        "Running {} strategies, {} iterations each, {} threads...",
        suite.len(),
        settings.spec.total_iterations(),
        settings.strategy.worker_threads()
    )
}

fn run_strategies(settings: &RunSettings) -> anyhow::Result<()> {
    let suite = build_suite(settings);

    // Keep stdout clean for machine-readable formats
    if settings.format == OutputFormat::Human || settings.output.is_some() {
        println!("{}\n", run_header(&suite, settings));
    }

    let report = run_suite(&suite, settings, true);
    write_outputs(settings, &report)?;

    // Exit with appropriate code
    if !report.summary.baseline_completed {
        eprintln!("\nScalar baseline did not complete; no speedups can be reported");
        std::process::exit(1);
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("flopbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_filter_always_keeps_scalar() {
        let kinds = select_strategies("gpu").unwrap();
        assert_eq!(kinds, vec![StrategyKind::Scalar, StrategyKind::GpuOffload]);

        let kinds = select_strategies(".*").unwrap();
        assert_eq!(kinds, StrategyKind::ALL.to_vec());

        let kinds = select_strategies("vectorized$").unwrap();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::Scalar,
                StrategyKind::Vectorized,
                StrategyKind::MultiThreadVectorized
            ]
        );
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        assert!(select_strategies("(").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = parse(&[
            "run",
            "--iterations",
            "5000",
            "-j",
            "3",
            "--gpu-workgroups",
            "8",
            "--no-gpu",
            "--format",
            "csv",
        ]);
        let mut config = FlopConfig::default();
        config.runner.threads = 7;
        config.gpu.workgroups = 64;

        let settings = RunSettings::resolve(&cli, &config, ".*").unwrap();
        assert_eq!(settings.spec.total_iterations(), 5000);
        assert_eq!(settings.strategy.threads, Some(3));
        assert_eq!(settings.strategy.gpu.workgroups, 8);
        assert!(!settings.capabilities.has_gpu);
        assert_eq!(settings.format, OutputFormat::Csv);
        assert!(settings.save_json.is_none());
        assert_eq!(settings.workload_info().ops_per_iteration, 4);
    }

    #[test]
    fn test_config_supplies_defaults() {
        let cli = parse(&[]);
        let mut config = FlopConfig::default();
        config.workload.iterations = 1234;
        config.capabilities.simd = false;
        config.output.save_json = true;
        config.output.directory = "out".to_string();

        let settings = RunSettings::resolve(&cli, &config, &cli.filter).unwrap();
        assert_eq!(settings.spec.total_iterations(), 1234);
        assert!(settings.strategy.threads.is_none());
        assert!(!settings.capabilities.has_vector_ext);
        assert_eq!(settings.format, OutputFormat::Human);
        assert_eq!(settings.save_json, Some(PathBuf::from("out").join("report.json")));
    }

    #[test]
    fn test_rejects_zero_iterations_and_unknown_format() {
        let config = FlopConfig::default();
        let cli = parse(&["--iterations", "0"]);
        assert!(RunSettings::resolve(&cli, &config, ".*").is_err());
        let cli = parse(&["--format", "html"]);
        assert!(RunSettings::resolve(&cli, &config, ".*").is_err());
    }

    #[test]
    fn test_subcommands_parse() {
        assert!(matches!(parse(&["list"]).command, Some(Commands::List)));
        assert!(matches!(parse(&["caps"]).command, Some(Commands::Caps)));
        assert!(matches!(
            parse(&["init", "--force"]).command,
            Some(Commands::Init { force: true })
        ));
        let cli = parse(&["run", "multi"]);
        match cli.command {
            Some(Commands::Run { filter }) => assert_eq!(filter.as_deref(), Some("multi")),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(parse(&["scalar"]).filter, "scalar");
    }

    #[test]
    fn test_run_suite_scalar_only() {
        let cli = parse(&[
            "--iterations",
            "20000",
            "--no-simd",
            "--no-threads",
            "--no-gpu",
        ]);
        let settings = RunSettings::resolve(&cli, &FlopConfig::default(), ".*").unwrap();
        let report = run_suite(&build_suite(&settings), &settings, false);

        assert!(report.summary.baseline_completed);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].name, "scalar");
        assert_eq!(report.results[0].relative_speedup, Some(1.0));
        assert_eq!(report.skipped.len(), 4);

        let json = render_report(&report, OutputFormat::Json).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.meta.schema_version, SCHEMA_VERSION);
        assert_eq!(
            parsed.results[0].metrics.as_ref().unwrap().total_operations,
            80_000
        );
    }

    #[test]
    fn test_header_counts_only_runnable_strategies() {
        let cli = parse(&[
            "--iterations",
            "1000",
            "-j",
            "2",
            "--no-simd",
            "--no-threads",
            "--no-gpu",
        ]);
        let settings = RunSettings::resolve(&cli, &FlopConfig::default(), ".*").unwrap();
        assert_eq!(settings.kinds.len(), 5);

        let suite = build_suite(&settings);
        assert_eq!(
            run_header(&suite, &settings),
            "Running 1 strategies, 1000 iterations each, 2 threads..."
        );
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        write_file(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
