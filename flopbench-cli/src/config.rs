//! Configuration loading from flopbench.toml
//!
//! FlopBench configuration can be specified in a `flopbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Every field has a default; command-line flags override file values.

use flopbench_core::{DEFAULT_ITERATIONS, GpuSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`FlopConfig::discover`]
pub const CONFIG_FILE: &str = "flopbench.toml";

/// FlopBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlopConfig {
    /// Workload size
    #[serde(default)]
    pub workload: WorkloadConfig,
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Capability allow-list
    #[serde(default)]
    pub capabilities: CapabilityConfig,
    /// GPU dispatch settings
    #[serde(default)]
    pub gpu: GpuSettings,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Workload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Kernel iterations every strategy executes
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u64 {
    DEFAULT_ITERATIONS
}

/// Runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Worker threads for multi-thread strategies (0 = detected core count)
    #[serde(default)]
    pub threads: usize,
    /// CPU to pin single-lane strategies to
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

/// Which capabilities the user allows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Allow vectorized strategies
    #[serde(default = "default_true")]
    pub simd: bool,
    /// Allow multi-thread strategies
    #[serde(default = "default_true")]
    pub threads: bool,
    /// Allow the GPU strategy
    #[serde(default = "default_true")]
    pub gpu: bool,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            simd: true,
            threads: true,
            gpu: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "github", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for saved reports
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Save a JSON report after each run
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/flopbench".to_string()
}

impl FlopConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(dir)
    }

    /// Walk up from `dir` looking for `flopbench.toml`
    pub fn discover_from(mut dir: PathBuf) -> Option<Self> {
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            error = %e,
                            "ignoring unreadable configuration"
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# FlopBench Configuration

[workload]
# Kernel iterations every strategy executes (4 floating-point ops each)
iterations = 400000000

[runner]
# Worker threads for multi-thread strategies (0 = detected core count)
threads = 0
# Pin single-lane strategies to this CPU (uncomment to enable)
# pin_cpu = 0

[capabilities]
# Allow vectorized strategies (AVX2+FMA or NEON)
simd = true
# Allow multi-thread strategies
threads = true
# Allow the GPU strategy (requires a build with the `gpu` feature)
gpu = true

[gpu]
# Workgroups dispatched; global work size = workgroups x 256
workgroups = 256
# Adapter preference: "high-performance" or "low-power"
power_preference = "high-performance"

[output]
# Default output format: human, json, github, csv
format = "human"
# Output directory for saved reports
directory = "target/flopbench"
# Save a JSON report after each run
save_json = false
"#
        .to_string()
    }
}
