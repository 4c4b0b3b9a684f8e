//! System Metadata Collection
//!
//! Collects system information for report metadata including CPU, memory,
//! OS details, and git information.
//!
//! ## Collected Data
//!
//! - **Git**: Current commit hash and branch name
//! - **OS**: Operating system name and architecture
//! - **CPU**: Model name and core count
//! - **Memory**: Total system RAM in GB
//! - **Timestamp**: UTC time of report generation
//!
//! Linux-specific data (CPU model, memory) gracefully degrades on other
//! platforms, returning "Unknown" or 0 values.

use chrono::Utc;
use flopbench_core::Capabilities;
use flopbench_report::{ReportMeta, SystemInfo, WorkloadInfo};

/// Report schema version written into every report
pub const SCHEMA_VERSION: u32 = 1;

/// Build report metadata including system info and git details
pub fn build_report_meta(capabilities: Capabilities, workload: WorkloadInfo) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        git_commit: git(&["rev-parse", "HEAD"]),
        git_branch: git(&["rev-parse", "--abbrev-ref", "HEAD"]),
        system: collect_system_info(),
        capabilities,
        workload,
    }
}

/// Describe the host
pub fn collect_system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: get_cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: num_cpus(),
        memory_gb: get_memory_gb().unwrap_or(0.0),
    }
}

/// Run a git query, `None` outside a checkout or without git installed
fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get CPU model name from /proc/cpuinfo (Linux only)
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| parse_cpu_model(&content))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// x86 reports "model name"; many ARM kernels only report "Model" or "Hardware"
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    ["model name", "Model", "Hardware"].iter().find_map(|key| {
        cpuinfo
            .lines()
            .find(|l| l.split(':').next().map(str::trim) == Some(*key))
            .and_then(|l| l.split_once(':'))
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Get number of available CPU cores
fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Get total system memory in GB (Linux only)
fn get_memory_gb() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| parse_mem_total_gb(&content))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_mem_total_gb(meminfo: &str) -> Option<f64> {
    meminfo
        .lines()
        .find(|l| l.starts_with("MemTotal"))
        .and_then(|l| {
            l.split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<u64>().ok())
        })
        .map(|kb| kb as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_model() {
        let x86 = "processor\t: 0\nmodel name\t: AMD Ryzen 9 7950X\nflags\t: fpu\n";
        assert_eq!(parse_cpu_model(x86).as_deref(), Some("AMD Ryzen 9 7950X"));

        let arm = "processor\t: 0\nBogoMIPS\t: 108.00\nModel\t: Raspberry Pi 5\n";
        assert_eq!(parse_cpu_model(arm).as_deref(), Some("Raspberry Pi 5"));

        assert!(parse_cpu_model("processor\t: 0\n").is_none());
    }

    #[test]
    fn test_parse_mem_total() {
        let meminfo = "MemTotal:       16777216 kB\nMemFree:         1024 kB\n";
        assert_eq!(parse_mem_total_gb(meminfo), Some(16.0));
        assert!(parse_mem_total_gb("MemFree: 1 kB\n").is_none());
    }

    #[test]
    fn test_meta_carries_workload() {
        let workload = WorkloadInfo {
            total_iterations: 1000,
            ops_per_iteration: 4,
            threads: 2,
            gpu_workgroups: 256,
        };
        let meta = build_report_meta(Capabilities::none(), workload);
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.workload.total_iterations, 1000);
        assert!(meta.system.cpu_cores >= 1);
        assert!(!meta.system.cpu.is_empty());
    }
}
