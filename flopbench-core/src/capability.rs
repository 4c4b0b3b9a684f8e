//! Capability descriptor
//!
//! Detected once at startup, then narrowed by configuration. The suite only
//! constructs strategies whose required capabilities are all present.

use crate::simd::VectorUnit;
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};

/// What this build and this machine can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A packed f64 extension (AVX2+FMA or NEON) is usable at runtime
    pub has_vector_ext: bool,
    /// The OS reports how many threads can run in parallel
    pub has_threading: bool,
    /// The GPU backend was compiled in
    pub has_gpu: bool,
    /// The build enabled vector extensions at compile time (target-cpu tuning)
    pub has_native_arch: bool,
    /// Capabilities switched off by configuration rather than absent
    #[serde(default)]
    pub disabled: DisabledCapabilities,
}

/// Capabilities the user turned off with [`Capabilities::restrict`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledCapabilities {
    /// Vector strategies disabled
    pub vector_ext: bool,
    /// Multi-thread strategies disabled
    pub threading: bool,
    /// The GPU strategy disabled
    pub gpu: bool,
}

/// Skip reason for a capability the configuration turned off
pub const DISABLED_BY_CONFIG: &str = "disabled by configuration";

impl Capabilities {
    /// Probe the running machine and the build configuration
    pub fn detect() -> Self {
        let caps = Self {
            has_vector_ext: VectorUnit::detect().is_some(),
            has_threading: std::thread::available_parallelism().is_ok(),
            has_gpu: cfg!(feature = "gpu"),
            has_native_arch: cfg!(any(target_feature = "avx2", target_feature = "neon")),
            disabled: DisabledCapabilities::default(),
        };
        tracing::debug!(?caps, "detected capabilities");
        caps
    }

    /// Every capability present
    pub fn all() -> Self {
        Self {
            has_vector_ext: true,
            has_threading: true,
            has_gpu: true,
            has_native_arch: true,
            disabled: DisabledCapabilities::default(),
        }
    }

    /// No optional capability present
    pub fn none() -> Self {
        Self {
            has_vector_ext: false,
            has_threading: false,
            has_gpu: false,
            has_native_arch: false,
            disabled: DisabledCapabilities::default(),
        }
    }

    /// Narrow by what the user allows; a disallowed capability is never re-enabled
    pub fn restrict(self, simd: bool, threads: bool, gpu: bool) -> Self {
        Self {
            has_vector_ext: self.has_vector_ext && simd,
            has_threading: self.has_threading && threads,
            has_gpu: self.has_gpu && gpu,
            has_native_arch: self.has_native_arch,
            disabled: DisabledCapabilities {
                vector_ext: self.disabled.vector_ext || !simd,
                threading: self.disabled.threading || !threads,
                gpu: self.disabled.gpu || !gpu,
            },
        }
    }

    /// Whether every capability `kind` needs is present
    pub fn supports(&self, kind: StrategyKind) -> bool {
        self.missing(kind).is_none()
    }

    /// First missing capability for `kind`, if any.
    ///
    /// A capability the configuration turned off reports [`DISABLED_BY_CONFIG`].
    pub fn missing(&self, kind: StrategyKind) -> Option<&'static str> {
        let off = self.disabled;
        match kind {
            StrategyKind::Scalar => None,
            StrategyKind::MultiThreadScalar | StrategyKind::MultiThreadVectorized
                if !self.has_threading =>
            {
                Some(if off.threading {
                    DISABLED_BY_CONFIG
                } else {
                    "threading unavailable"
                })
            }
            StrategyKind::Vectorized | StrategyKind::MultiThreadVectorized
                if !self.has_vector_ext =>
            {
                Some(if off.vector_ext {
                    DISABLED_BY_CONFIG
                } else {
                    "no vector extension"
                })
            }
            StrategyKind::GpuOffload if !self.has_gpu => Some(if off.gpu {
                DISABLED_BY_CONFIG
            } else {
                "GPU backend unavailable"
            }),
            _ => None,
        }
    }

    /// Whether `kind` is skipped only because the configuration turned it off
    pub fn is_disabled(&self, kind: StrategyKind) -> bool {
        self.missing(kind) == Some(DISABLED_BY_CONFIG)
    }
}
