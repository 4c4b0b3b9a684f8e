//! Error types for strategies and the suite

use thiserror::Error;

/// Failure of a single execution strategy.
///
/// None of these abort a suite run: capability gaps exclude the strategy,
/// everything else marks it failed in the result stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// A hardware or runtime feature the strategy needs is absent
    #[error("{strategy}: capability unavailable: {reason}")]
    CapabilityUnavailable {
        /// Strategy that could not be constructed or started
        strategy: String,
        /// What is missing
        reason: String,
    },

    /// A GPU build/submit/execute step failed after a device was found
    #[error("device operation failed during {stage}: {message}")]
    DeviceOperationFailed {
        /// Which step failed (e.g. "build pipeline", "execute kernel")
        stage: String,
        /// Backend error message
        message: String,
    },

    /// Timing or operation count cannot produce a valid throughput
    #[error("measurement inconsistency: {0}")]
    MeasurementInconsistency(String),

    /// The workload cannot be expressed by this strategy
    #[error("invalid workload: {0}")]
    InvalidWorkload(String),

    /// The strategy panicked while running
    #[error("strategy panicked: {0}")]
    Panicked(String),
}

impl StrategyError {
    /// Shorthand for a [`StrategyError::CapabilityUnavailable`]
    pub fn unavailable(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        StrategyError::CapabilityUnavailable {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`StrategyError::DeviceOperationFailed`]
    pub fn device(stage: impl Into<String>, message: impl std::fmt::Display) -> Self {
        StrategyError::DeviceOperationFailed {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Whether the suite should skip (rather than fail) the strategy
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, StrategyError::CapabilityUnavailable { .. })
    }

    /// Stable kebab-case label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyError::CapabilityUnavailable { .. } => "capability-unavailable",
            StrategyError::DeviceOperationFailed { .. } => "device-operation-failed",
            StrategyError::MeasurementInconsistency(_) => "measurement-inconsistency",
            StrategyError::InvalidWorkload(_) => "invalid-workload",
            StrategyError::Panicked(_) => "panic",
        }
    }
}

/// Errors raised when querying a finished suite
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuiteError {
    /// The scalar baseline produced no valid result
    #[error("no baseline: the scalar strategy did not produce a valid result")]
    NoBaseline,

    /// Name does not match any known strategy
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// The strategy exists but did not complete in this run
    #[error("no completed result for strategy {0}")]
    MissingResult(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_classification() {
        let err = StrategyError::unavailable("vectorized", "no AVX2");
        assert!(err.is_capability_unavailable());
        assert_eq!(err.kind(), "capability-unavailable");
        assert_eq!(
            err.to_string(),
            "vectorized: capability unavailable: no AVX2"
        );

        let err = StrategyError::device("execute kernel", "lost device");
        assert!(!err.is_capability_unavailable());
        assert_eq!(err.kind(), "device-operation-failed");
    }
}
