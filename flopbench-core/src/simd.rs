//! Packed recurrence kernels
//!
//! Four f64 sub-lanes advance together per vector step:
//! - x86_64: one 256-bit AVX2 register per operand, FMA for the first step
//! - aarch64: two 128-bit NEON registers per operand, `vfmaq_f64` for the first step
//!
//! A [`VectorUnit`] can only be obtained from [`VectorUnit::detect`], so
//! holding one proves the instruction set is present at runtime.

use crate::kernel::{DECAY, INCREMENT, LANE_SEED_STEP};
use std::hint::black_box;

/// Packed sub-lanes per vector step
pub const VECTOR_WIDTH: usize = 4;

const SEED_A: [f64; VECTOR_WIDTH] = [1.1, 1.2, 1.3, 1.4];
const SEED_B: [f64; VECTOR_WIDTH] = [2.1, 2.2, 2.3, 2.4];

/// Instruction set backing the packed kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorIsa {
    /// 256-bit AVX2 with fused multiply-add
    #[cfg(target_arch = "x86_64")]
    Avx2Fma,
    /// 2×128-bit NEON
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl VectorIsa {
    /// Human-readable instruction set name
    pub fn name(&self) -> &'static str {
        match *self {
            #[cfg(target_arch = "x86_64")]
            VectorIsa::Avx2Fma => "AVX2+FMA",
            #[cfg(target_arch = "aarch64")]
            VectorIsa::Neon => "NEON",
        }
    }
}

impl std::fmt::Display for VectorIsa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Seed operands for one packed lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedLanes {
    /// First multiplicand per sub-lane
    pub a: [f64; VECTOR_WIDTH],
    /// Second multiplicand per sub-lane
    pub b: [f64; VECTOR_WIDTH],
}

impl PackedLanes {
    /// Seeds for the packed lane owned by `thread`
    pub fn seeded(thread: usize) -> Self {
        let offset = LANE_SEED_STEP * thread as f64;
        Self {
            a: SEED_A.map(|v| v + offset),
            b: SEED_B.map(|v| v + offset),
        }
    }
}

/// Proof of a usable vector extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorUnit {
    isa: VectorIsa,
}

impl VectorUnit {
    /// Probe the running CPU
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            Some(Self {
                isa: VectorIsa::Avx2Fma,
            })
        } else {
            None
        }
    }

    /// Probe the running CPU
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Option<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(Self {
                isa: VectorIsa::Neon,
            })
        } else {
            None
        }
    }

    /// Probe the running CPU
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Option<Self> {
        None
    }

    /// Instruction set in use
    pub fn isa(&self) -> VectorIsa {
        self.isa
    }

    /// Run `steps` packed steps from `lanes` and return each sub-lane's terminal `result`
    #[inline(never)]
    pub fn run(&self, lanes: PackedLanes, steps: u64) -> [f64; VECTOR_WIDTH] {
        let lanes = black_box(lanes);
        let steps = black_box(steps);
        let out = match self.isa {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `self` exists only if AVX2 and FMA were detected.
            VectorIsa::Avx2Fma => unsafe { avx2::run_packed(lanes, steps) },
            #[cfg(target_arch = "aarch64")]
            // SAFETY: `self` exists only if NEON was detected.
            VectorIsa::Neon => unsafe { neon::run_packed(lanes, steps) },
        };
        black_box(out)
    }
}

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use super::{DECAY, INCREMENT, PackedLanes, VECTOR_WIDTH};
    use std::arch::x86_64::*;

    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn run_packed(lanes: PackedLanes, steps: u64) -> [f64; VECTOR_WIDTH] {
        unsafe {
            let mut a = _mm256_loadu_pd(lanes.a.as_ptr());
            let mut b = _mm256_loadu_pd(lanes.b.as_ptr());
            let mut result = _mm256_setzero_pd();
            let decay = _mm256_set1_pd(DECAY);
            let increment = _mm256_set1_pd(INCREMENT);

            for _ in 0..steps {
                result = _mm256_fmadd_pd(a, b, result);
                a = _mm256_mul_pd(result, decay);
                b = _mm256_add_pd(a, increment);
            }

            let mut out = [0.0f64; VECTOR_WIDTH];
            _mm256_storeu_pd(out.as_mut_ptr(), result);
            out
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod neon {
    use super::{DECAY, INCREMENT, PackedLanes, VECTOR_WIDTH};
    use std::arch::aarch64::*;

    #[target_feature(enable = "neon")]
    pub(super) unsafe fn run_packed(lanes: PackedLanes, steps: u64) -> [f64; VECTOR_WIDTH] {
        unsafe {
            let mut a_lo = vld1q_f64(lanes.a.as_ptr());
            let mut a_hi = vld1q_f64(lanes.a.as_ptr().add(2));
            let mut b_lo = vld1q_f64(lanes.b.as_ptr());
            let mut b_hi = vld1q_f64(lanes.b.as_ptr().add(2));
            let mut result_lo = vdupq_n_f64(0.0);
            let mut result_hi = vdupq_n_f64(0.0);
            let decay = vdupq_n_f64(DECAY);
            let increment = vdupq_n_f64(INCREMENT);

            for _ in 0..steps {
                // vfmaq_f64(acc, x, y) = acc + x*y
                result_lo = vfmaq_f64(result_lo, a_lo, b_lo);
                result_hi = vfmaq_f64(result_hi, a_hi, b_hi);
                a_lo = vmulq_f64(result_lo, decay);
                a_hi = vmulq_f64(result_hi, decay);
                b_lo = vaddq_f64(a_lo, increment);
                b_hi = vaddq_f64(a_hi, increment);
            }

            let mut out = [0.0f64; VECTOR_WIDTH];
            vst1q_f64(out.as_mut_ptr(), result_lo);
            vst1q_f64(out.as_mut_ptr().add(2), result_hi);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(lanes: PackedLanes, steps: u64) -> [f64; VECTOR_WIDTH] {
        let mut out = [0.0; VECTOR_WIDTH];
        for j in 0..VECTOR_WIDTH {
            let (mut a, mut b, mut result) = (lanes.a[j], lanes.b[j], 0.0f64);
            for _ in 0..steps {
                result = a.mul_add(b, result);
                a = result * DECAY;
                b = a + INCREMENT;
            }
            out[j] = result;
        }
        out
    }

    #[test]
    fn test_seeds_offset_by_thread() {
        let lanes = PackedLanes::seeded(2);
        assert!((lanes.a[0] - 1.3).abs() < 1e-12);
        assert!((lanes.b[3] - 2.6).abs() < 1e-12);
    }

    #[test]
    fn test_packed_matches_fused_reference() {
        let Some(unit) = VectorUnit::detect() else {
            return;
        };
        for steps in [0, 1, 3] {
            let lanes = PackedLanes::seeded(1);
            let got = unit.run(lanes, steps);
            let want = reference(lanes, steps);
            for j in 0..VECTOR_WIDTH {
                let tolerance = want[j].abs() * 1e-12;
                assert!(
                    (got[j] - want[j]).abs() <= tolerance,
                    "sub-lane {j} after {steps} steps: {} vs {}",
                    got[j],
                    want[j]
                );
            }
        }
    }

    #[test]
    fn test_isa_matches_architecture() {
        if let Some(unit) = VectorUnit::detect() {
            #[cfg(target_arch = "x86_64")]
            assert_eq!(unit.isa(), VectorIsa::Avx2Fma);
            #[cfg(target_arch = "aarch64")]
            assert_eq!(unit.isa(), VectorIsa::Neon);
        }
    }
}
