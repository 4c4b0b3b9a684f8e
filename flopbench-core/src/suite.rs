//! Benchmark Suite
//!
//! Sequences the configured strategies in canonical order, one at a time,
//! and collects their outcomes:
//!
//! ```text
//! Capabilities + kinds
//!        │
//!        ▼
//!  BenchmarkSuite::new ──► skipped (missing capability)
//!        │
//!        ▼  run / run_with (catch_unwind per strategy)
//!  SuiteReport { entries, skipped }
//!        │
//!        ▼
//!  relative_speedup(name) = throughput(name) / throughput(scalar)
//! ```

use crate::aggregate::BenchmarkResult;
use crate::capability::Capabilities;
use crate::error::{StrategyError, SuiteError};
use crate::kernel::WorkloadSpec;
use crate::strategy::{ExecutionStrategy, StrategyConfig, StrategyKind, build_strategy};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

/// A strategy excluded before producing a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStrategy {
    /// Strategy name
    pub name: String,
    /// Why it did not run
    pub reason: String,
}

/// Whether a strategy will run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    /// All required capabilities are present
    Ready,
    /// Excluded, with the missing capability
    Skipped(String),
}

/// One line of the execution plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Strategy kind
    pub kind: StrategyKind,
    /// Will it run
    pub status: PlanStatus,
}

/// Outcome of one executed strategy
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// Produced a valid measurement
    Completed(BenchmarkResult),
    /// Ran (or was constructed) and failed
    Failed {
        /// Strategy name
        name: String,
        /// What went wrong
        error: StrategyError,
    },
}

impl StrategyOutcome {
    /// Strategy name
    pub fn name(&self) -> &str {
        match self {
            StrategyOutcome::Completed(result) => result.name(),
            StrategyOutcome::Failed { name, .. } => name,
        }
    }

    /// The result, if the strategy completed
    pub fn result(&self) -> Option<&BenchmarkResult> {
        match self {
            StrategyOutcome::Completed(result) => Some(result),
            StrategyOutcome::Failed { .. } => None,
        }
    }
}

/// Progress notifications from [`BenchmarkSuite::run_with`]
#[derive(Debug)]
pub enum SuiteEvent<'a> {
    /// A strategy is about to run
    Started {
        /// Strategy name
        name: &'a str,
        /// Zero-based position in the run
        index: usize,
        /// Strategies scheduled
        total: usize,
    },
    /// A strategy produced an outcome
    Finished(&'a StrategyOutcome),
    /// A strategy found a capability missing at run time
    Skipped(&'a SkippedStrategy),
}

enum Planned {
    Ready(Box<dyn ExecutionStrategy>),
    Broken(StrategyKind, StrategyError),
}

impl Planned {
    fn kind(&self) -> StrategyKind {
        match self {
            Planned::Ready(strategy) => strategy.kind(),
            Planned::Broken(kind, _) => *kind,
        }
    }
}

/// Ordered set of constructed strategies
pub struct BenchmarkSuite {
    planned: Vec<Planned>,
    skipped: Vec<SkippedStrategy>,
}

impl BenchmarkSuite {
    /// Construct every requested strategy the capabilities allow.
    ///
    /// Kinds are deduplicated and put in canonical order. Missing capabilities
    /// (declared or found during construction) become skipped entries; other
    /// construction errors are reported as failures when the suite runs.
    pub fn new(caps: &Capabilities, kinds: &[StrategyKind], config: &StrategyConfig) -> Self {
        let mut planned = Vec::new();
        let mut skipped = Vec::new();

        for entry in Self::plan(caps, kinds) {
            let name = entry.kind.name();
            if let PlanStatus::Skipped(reason) = entry.status {
                if caps.is_disabled(entry.kind) {
                    tracing::info!(strategy = name, %reason, "skipping strategy");
                } else {
                    tracing::warn!(strategy = name, %reason, "skipping strategy");
                }
                skipped.push(SkippedStrategy {
                    name: name.to_string(),
                    reason,
                });
                continue;
            }

            match build_strategy(entry.kind, config) {
                Ok(strategy) => planned.push(Planned::Ready(strategy)),
                Err(e) if e.is_capability_unavailable() => {
                    tracing::warn!(strategy = name, error = %e, "skipping strategy");
                    skipped.push(SkippedStrategy {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(strategy = name, error = %e, "strategy setup failed");
                    planned.push(Planned::Broken(entry.kind, e));
                }
            }
        }

        Self { planned, skipped }
    }

    /// Suite over already-constructed strategies, run in canonical kind order
    pub fn from_strategies(mut strategies: Vec<Box<dyn ExecutionStrategy>>) -> Self {
        strategies.sort_by_key(|s| s.kind());
        Self {
            planned: strategies.into_iter().map(Planned::Ready).collect(),
            skipped: Vec::new(),
        }
    }

    /// Which of `kinds` would run under `caps`, in canonical order, without constructing anything
    pub fn plan(caps: &Capabilities, kinds: &[StrategyKind]) -> Vec<PlanEntry> {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        kinds
            .into_iter()
            .map(|kind| PlanEntry {
                kind,
                status: match caps.missing(kind) {
                    None => PlanStatus::Ready,
                    Some(reason) => PlanStatus::Skipped(reason.to_string()),
                },
            })
            .collect()
    }

    /// Strategies scheduled to run (including ones whose setup failed)
    pub fn len(&self) -> usize {
        self.planned.len()
    }

    /// Nothing scheduled
    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }

    /// Strategies excluded at construction
    pub fn skipped(&self) -> &[SkippedStrategy] {
        &self.skipped
    }

    /// Scheduled strategy kinds, in run order
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.planned.iter().map(Planned::kind).collect()
    }

    /// Run every strategy once
    pub fn run(&self, spec: &WorkloadSpec) -> SuiteReport {
        self.run_with(spec, |_| {})
    }

    /// Run every strategy once, reporting progress to `observer`
    pub fn run_with<F>(&self, spec: &WorkloadSpec, mut observer: F) -> SuiteReport
    where
        F: FnMut(SuiteEvent<'_>),
    {
        let started = Instant::now();
        let total = self.planned.len();
        let mut entries = Vec::with_capacity(total);
        let mut skipped = self.skipped.clone();

        for (index, planned) in self.planned.iter().enumerate() {
            let name = planned.kind().name();
            observer(SuiteEvent::Started { name, index, total });

            let outcome = match planned {
                Planned::Broken(_, error) => Err(error.clone()),
                Planned::Ready(strategy) => {
                    tracing::info!(
                        strategy = name,
                        iterations = spec.total_iterations(),
                        "running strategy"
                    );
                    run_guarded(strategy.as_ref(), spec)
                }
            };

            match outcome {
                Ok(result) => {
                    tracing::info!(
                        strategy = name,
                        elapsed_s = result.elapsed_seconds(),
                        ops_per_sec = result.throughput_ops_per_sec(),
                        "strategy finished"
                    );
                    entries.push(StrategyOutcome::Completed(result));
                }
                Err(error) if error.is_capability_unavailable() => {
                    tracing::warn!(strategy = name, %error, "skipping strategy");
                    skipped.push(SkippedStrategy {
                        name: name.to_string(),
                        reason: error.to_string(),
                    });
                    if let Some(last) = skipped.last() {
                        observer(SuiteEvent::Skipped(last));
                    }
                    continue;
                }
                Err(error) => {
                    tracing::error!(strategy = name, %error, "strategy failed");
                    entries.push(StrategyOutcome::Failed {
                        name: name.to_string(),
                        error,
                    });
                }
            }

            if let Some(last) = entries.last() {
                observer(SuiteEvent::Finished(last));
            }
        }

        SuiteReport {
            entries,
            skipped,
            wall_time: started.elapsed(),
        }
    }
}

/// Run one strategy, converting a panic into [`StrategyError::Panicked`]
fn run_guarded(
    strategy: &dyn ExecutionStrategy,
    spec: &WorkloadSpec,
) -> Result<BenchmarkResult, StrategyError> {
    match catch_unwind(AssertUnwindSafe(|| strategy.run(spec))) {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(StrategyError::Panicked(message))
        }
    }
}

/// Everything one suite run produced
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    entries: Vec<StrategyOutcome>,
    skipped: Vec<SkippedStrategy>,
    wall_time: Duration,
}

impl SuiteReport {
    /// Assemble a report from outcomes gathered elsewhere
    pub fn from_outcomes(entries: Vec<StrategyOutcome>, skipped: Vec<SkippedStrategy>) -> Self {
        Self {
            entries,
            skipped,
            wall_time: Duration::ZERO,
        }
    }

    /// Executed strategies in execution order
    pub fn entries(&self) -> &[StrategyOutcome] {
        &self.entries
    }

    /// Completed results in execution order
    pub fn results(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.entries.iter().filter_map(StrategyOutcome::result)
    }

    /// Strategies that never produced an outcome
    pub fn skipped(&self) -> &[SkippedStrategy] {
        &self.skipped
    }

    /// Wall time of the whole run, setup excluded
    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    /// Completed result for `name`
    pub fn result(&self, name: &str) -> Result<&BenchmarkResult, SuiteError> {
        let kind: StrategyKind = name.parse()?;
        self.results()
            .find(|r| r.name() == kind.name())
            .ok_or_else(|| SuiteError::MissingResult(name.to_string()))
    }

    /// The scalar reference result
    pub fn baseline(&self) -> Result<&BenchmarkResult, SuiteError> {
        self.result(StrategyKind::Scalar.name())
            .map_err(|_| SuiteError::NoBaseline)
    }

    /// `throughput(name) / throughput(scalar)`
    pub fn relative_speedup(&self, name: &str) -> Result<f64, SuiteError> {
        let baseline = self.baseline()?;
        let result = self.result(name)?;
        Ok(result.throughput_ops_per_sec() / baseline.throughput_ops_per_sec())
    }

    /// Highest-throughput completed result
    pub fn peak(&self) -> Option<&BenchmarkResult> {
        self.results()
            .max_by(|a, b| a.throughput_ops_per_sec().total_cmp(&b.throughput_ops_per_sec()))
    }

    /// Whether the run satisfied the exit contract (scalar baseline completed)
    pub fn is_success(&self) -> bool {
        self.baseline().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        kind: StrategyKind,
        seconds: f64,
    }

    impl ExecutionStrategy for Fixed {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
            BenchmarkResult::new(self.name(), self.seconds, spec.total_iterations())
        }
    }

    struct Panics;

    impl ExecutionStrategy for Panics {
        fn kind(&self) -> StrategyKind {
            StrategyKind::MultiThreadScalar
        }

        fn run(&self, _spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
            panic!("worker exploded")
        }
    }

    struct Unavailable;

    impl ExecutionStrategy for Unavailable {
        fn kind(&self) -> StrategyKind {
            StrategyKind::GpuOffload
        }

        fn run(&self, _spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
            Err(StrategyError::unavailable(self.name(), "device lost"))
        }
    }

    struct DeviceFails;

    impl ExecutionStrategy for DeviceFails {
        fn kind(&self) -> StrategyKind {
            StrategyKind::GpuOffload
        }

        fn run(&self, _spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
            Err(StrategyError::device("readback", "buffer map failed"))
        }
    }

    fn spec() -> WorkloadSpec {
        WorkloadSpec::new(100_000_000).unwrap()
    }

    fn scalar(seconds: f64) -> Box<dyn ExecutionStrategy> {
        Box::new(Fixed {
            kind: StrategyKind::Scalar,
            seconds,
        })
    }

    fn failure(report: &SuiteReport, name: &str) -> StrategyError {
        let entry = report
            .entries()
            .iter()
            .find(|e| e.name() == name)
            .unwrap();
        assert!(entry.result().is_none());
        match entry {
            StrategyOutcome::Failed { error, .. } => error.clone(),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_speedup_against_scalar() {
        let suite = BenchmarkSuite::from_strategies(vec![
            Box::new(Fixed {
                kind: StrategyKind::Vectorized,
                seconds: 0.1,
            }),
            Box::new(Fixed {
                kind: StrategyKind::Scalar,
                seconds: 2.0,
            }),
        ]);
        let report = suite.run(&spec());

        let names: Vec<&str> = report.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["scalar", "vectorized"]);
        assert_eq!(
            report.baseline().unwrap().throughput_ops_per_sec(),
            200_000_000.0
        );
        assert_eq!(report.relative_speedup("scalar").unwrap(), 1.0);
        assert!((report.relative_speedup("vectorized").unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(report.peak().unwrap().name(), "vectorized");
        assert!(report.is_success());
    }

    #[test]
    fn test_no_baseline() {
        let suite = BenchmarkSuite::from_strategies(vec![Box::new(Fixed {
            kind: StrategyKind::Vectorized,
            seconds: 1.0,
        })]);
        let report = suite.run(&spec());
        assert_eq!(
            report.relative_speedup("vectorized"),
            Err(SuiteError::NoBaseline)
        );
        assert!(!report.is_success());
    }

    #[test]
    fn test_unknown_and_missing_names() {
        let report = BenchmarkSuite::from_strategies(vec![Box::new(Fixed {
            kind: StrategyKind::Scalar,
            seconds: 1.0,
        })])
        .run(&spec());
        assert!(matches!(
            report.relative_speedup("warp-drive"),
            Err(SuiteError::UnknownStrategy(_))
        ));
        assert!(matches!(
            report.relative_speedup("gpu-offload"),
            Err(SuiteError::MissingResult(_))
        ));
    }

    #[test]
    fn test_panic_is_recorded_not_propagated() {
        let suite = BenchmarkSuite::from_strategies(vec![
            Box::new(Panics),
            Box::new(Fixed {
                kind: StrategyKind::Scalar,
                seconds: 1.0,
            }),
        ]);
        let report = suite.run(&spec());
        assert_eq!(report.entries().len(), 2);
        match &report.entries()[1] {
            StrategyOutcome::Failed { name, error } => {
                assert_eq!(name, "multi-thread-scalar");
                assert_eq!(error, &StrategyError::Panicked("worker exploded".to_string()));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(report.is_success());
    }

    #[test]
    fn test_runtime_unavailability_is_skipped() {
        let suite = BenchmarkSuite::from_strategies(vec![
            Box::new(Unavailable),
            Box::new(Fixed {
                kind: StrategyKind::Scalar,
                seconds: 1.0,
            }),
        ]);
        let mut events = Vec::new();
        let report = suite.run_with(&spec(), |event| {
            events.push(match event {
                SuiteEvent::Started { .. } => "started",
                SuiteEvent::Finished(_) => "finished",
                SuiteEvent::Skipped(_) => "skipped",
            })
        });
        assert_eq!(report.entries().len(), 1);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(report.skipped()[0].name, "gpu-offload");
        assert_eq!(events, vec!["started", "finished", "started", "skipped"]);
    }

    #[test]
    fn test_device_failure_is_recorded_as_failed() {
        let suite = BenchmarkSuite::from_strategies(vec![Box::new(DeviceFails), scalar(1.0)]);
        let report = suite.run(&spec());

        assert_eq!(report.entries().len(), 2);
        assert!(report.skipped().is_empty());
        let error = failure(&report, "gpu-offload");
        assert_eq!(error.kind(), "device-operation-failed");
        assert!(report.result("gpu-offload").is_err());
        assert!(report.is_success());
    }

    #[test]
    fn test_zero_elapsed_is_a_measurement_failure() {
        let suite = BenchmarkSuite::from_strategies(vec![
            scalar(1.0),
            Box::new(Fixed {
                kind: StrategyKind::Vectorized,
                seconds: 0.0,
            }),
        ]);
        let report = suite.run(&spec());

        let error = failure(&report, "vectorized");
        assert_eq!(error.kind(), "measurement-inconsistency");
        assert_eq!(report.results().count(), 1);
        assert_eq!(report.peak().unwrap().name(), "scalar");
        assert!(report.is_success());
    }

    #[test]
    fn test_setup_failure_is_reported_when_run() {
        let suite = BenchmarkSuite {
            planned: vec![
                Planned::Ready(scalar(1.0)),
                Planned::Broken(
                    StrategyKind::MultiThreadScalar,
                    StrategyError::InvalidWorkload("zero workers".to_string()),
                ),
            ],
            skipped: Vec::new(),
        };
        assert_eq!(suite.len(), 2);
        assert_eq!(
            suite.kinds(),
            vec![StrategyKind::Scalar, StrategyKind::MultiThreadScalar]
        );

        let mut finished = Vec::new();
        let report = suite.run_with(&spec(), |event| {
            if let SuiteEvent::Finished(outcome) = event {
                finished.push(outcome.name().to_string());
            }
        });

        assert_eq!(finished, vec!["scalar", "multi-thread-scalar"]);
        let error = failure(&report, "multi-thread-scalar");
        assert_eq!(error.kind(), "invalid-workload");
        assert!(report.skipped().is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_failed_baseline_is_not_success() {
        let suite = BenchmarkSuite {
            planned: vec![Planned::Broken(
                StrategyKind::Scalar,
                StrategyError::Panicked("boom".to_string()),
            )],
            skipped: Vec::new(),
        };
        let report = suite.run(&spec());
        assert_eq!(failure(&report, "scalar").kind(), "panic");
        assert!(!report.is_success());
    }

    #[test]
    fn test_disabled_strategies_are_skipped_with_config_reason() {
        let caps = Capabilities::detect().restrict(false, false, false);
        let suite = BenchmarkSuite::new(&caps, &StrategyKind::ALL, &StrategyConfig::default());

        assert_eq!(suite.kinds(), vec![StrategyKind::Scalar]);
        assert_eq!(suite.skipped().len(), 4);
        assert!(
            suite
                .skipped()
                .iter()
                .all(|s| s.reason == crate::capability::DISABLED_BY_CONFIG)
        );
    }

    #[test]
    fn test_plan_orders_and_skips() {
        let caps = Capabilities::none();
        let plan = BenchmarkSuite::plan(
            &caps,
            &[
                StrategyKind::GpuOffload,
                StrategyKind::Scalar,
                StrategyKind::Scalar,
            ],
        );
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].kind, StrategyKind::Scalar);
        assert_eq!(plan[0].status, PlanStatus::Ready);
        assert!(matches!(plan[1].status, PlanStatus::Skipped(_)));
    }

    #[test]
    fn test_new_without_gpu_has_no_gpu_entry() {
        let caps = Capabilities::detect().restrict(true, true, false);
        let config = StrategyConfig {
            threads: Some(2),
            ..Default::default()
        };
        let suite = BenchmarkSuite::new(&caps, &StrategyKind::ALL, &config);
        assert!(!suite.kinds().contains(&StrategyKind::GpuOffload));
        assert!(suite.skipped().iter().any(|s| s.name == "gpu-offload"));

        let report = suite.run(&WorkloadSpec::new(10_000).unwrap());
        assert!(report.entries().iter().all(|e| e.name() != "gpu-offload"));
        assert!(report.is_success());
    }
}
