//! Unit conversion and display helpers

use std::time::Duration;

/// Operations per second expressed in MFLOPS
pub fn mflops(ops_per_sec: f64) -> f64 {
    ops_per_sec / 1e6
}

/// Operations per second expressed in GFLOPS
pub fn gflops(ops_per_sec: f64) -> f64 {
    ops_per_sec / 1e9
}

/// `x.xx GFLOPS` at or above one GFLOPS, `x MFLOPS` below
pub fn format_throughput(ops_per_sec: f64) -> String {
    if ops_per_sec >= 1e9 {
        format!("{:.2} GFLOPS", gflops(ops_per_sec))
    } else {
        format!("{:.0} MFLOPS", mflops(ops_per_sec))
    }
}

/// `12.34x`, or `N/A` when there is no baseline
pub fn format_speedup(speedup: Option<f64>) -> String {
    match speedup {
        Some(s) => format!("{:.2}x", s),
        None => "N/A".to_string(),
    }
}

/// Compact duration: `850 ns`, `12.50 µs`, `3.20 ms`, `1.234 s`
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2} µs", nanos as f64 / 1e3)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1e6)
    } else {
        format!("{:.3} s", duration.as_secs_f64())
    }
}
