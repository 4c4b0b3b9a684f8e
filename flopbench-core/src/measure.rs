//! High-Precision Timing
//!
//! Uses RDTSCP on x86_64 and CNTVCT_EL0 on AArch64 for minimal overhead
//! cycle counting alongside a monotonic `std::time::Instant`. Every strategy
//! bounds exactly its compute region with one [`Timer`].

use std::time::Instant;

/// Read the CPU cycle/tick counter (platform-specific).
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_cycles() -> u64 {
    // SAFETY: RDTSCP is available on all x86_64 CPUs since ~2006 and waits
    // for prior instructions to retire before reading the counter.
    unsafe {
        let mut _aux: u32 = 0;
        std::arch::x86_64::__rdtscp(&mut _aux)
    }
}

/// Read the virtual counter timer on AArch64 (comparable to x86 TSC).
#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_cycles() -> u64 {
    let cnt: u64;
    // SAFETY: CNTVCT_EL0 is readable from EL0 on all AArch64 implementations.
    unsafe {
        std::arch::asm!("mrs {}, cntvct_el0", out(reg) cnt, options(nostack, nomem));
    }
    cnt
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
fn read_cycles() -> u64 {
    0
}

/// Whether this platform provides real cycle counters.
pub const HAS_CYCLE_COUNTER: bool = cfg!(target_arch = "x86_64") || cfg!(target_arch = "aarch64");

/// One timed sample: wall-clock nanoseconds plus counter ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Elapsed wall-clock nanoseconds
    pub nanos: u64,
    /// Elapsed cycle/tick count (0 without a cycle counter)
    pub cycles: u64,
}

impl Measurement {
    /// Elapsed time in seconds
    pub fn seconds(&self) -> f64 {
        self.nanos as f64 / 1e9
    }
}

/// Timer bounding one strategy's compute region
pub struct Timer {
    start: Instant,
    cycles_start: u64,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        let cycles_start = read_cycles();
        Self {
            start: Instant::now(),
            cycles_start,
        }
    }

    /// Stop the timer and return the elapsed measurement
    #[inline(always)]
    pub fn stop(&self) -> Measurement {
        let nanos = self.start.elapsed().as_nanos() as u64;
        let cycles = read_cycles().saturating_sub(self.cycles_start);
        Measurement { nanos, cycles }
    }
}

/// Run `work` between a timer start and stop
#[inline(always)]
pub fn measure<T>(work: impl FnOnce() -> T) -> (T, Measurement) {
    let timer = Timer::start();
    let value = work();
    let elapsed = timer.stop();
    (value, elapsed)
}

/// Restrict the calling thread to `cpu`.
///
/// Fails with `InvalidInput` for an index outside the kernel's CPU set, and
/// with the OS error when the CPU is offline or not permitted.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    let set_size = libc::CPU_SETSIZE as usize;
    if cpu >= set_size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cpu {cpu} is outside the affinity mask (max {})", set_size - 1),
        ));
    }

    // SAFETY: an all-zero cpu_set_t is a valid empty set, and `cpu` was
    // bounds-checked against CPU_SETSIZE above.
    let mask = unsafe {
        let mut mask = MaybeUninit::<libc::cpu_set_t>::zeroed().assume_init();
        libc::CPU_SET(cpu, &mut mask);
        mask
    };
    let rc = unsafe { libc::sched_setaffinity(0, std::mem::size_of_val(&mask), &mask) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    tracing::debug!(cpu, "pinned thread");
    Ok(())
}

/// CPU pinning is a no-op off Linux
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_measure_covers_work() {
        let (value, elapsed) = measure(|| {
            std::thread::sleep(Duration::from_millis(10));
            7
        });
        assert_eq!(value, 7);
        assert!(elapsed.nanos >= 5_000_000);
        assert!(elapsed.seconds() > 0.0);
    }

    #[test]
    fn test_cycle_counter() {
        if HAS_CYCLE_COUNTER {
            let a = read_cycles();
            let b = read_cycles();
            assert!(b >= a, "cycle counter should be monotonic");
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_pin_rejects_out_of_range_cpu() {
        let err = pin_to_cpu(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_seconds_conversion() {
        let m = Measurement {
            nanos: 2_000_000_000,
            cycles: 0,
        };
        assert_eq!(m.seconds(), 2.0);
    }
}
