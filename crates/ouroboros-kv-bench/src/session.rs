//! Comparison session: runs the catalog against the subject and an
//! optional reference, and aggregates the results.

use crate::adapters::ReferenceConnector;
use crate::credentials::CredentialProvider;
use crate::endpoint::Endpoint;
use crate::error::{BenchError, Result};
use crate::record::{throughput, ResultRecord, Speedup};
use crate::scenario::{catalog, BenchmarkScenario};
use crate::target::{KvTarget, TargetResult};
use crate::timing::{Clock, MonotonicClock, TimingRunner};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Progress callbacks, invoked synchronously between scenarios
pub trait SessionObserver {
    fn scenario_started(&mut self, _index: usize, _total: usize, _scenario: &BenchmarkScenario) {}

    fn scenario_finished(&mut self, _index: usize, _total: usize, _record: &ResultRecord) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Reference-side totals over records that have reference data
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAggregate {
    pub total_ops: u64,
    pub total_elapsed: Duration,
    pub avg_throughput: f64,
}

/// Run-wide totals
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total_subject_ops: u64,
    pub total_subject_elapsed: Duration,
    pub avg_subject_throughput: f64,
    pub reference: Option<ReferenceAggregate>,
    pub overall: Speedup,
}

impl Aggregate {
    /// Totals over `records`. Sums are exact, so record order does not matter.
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let total_subject_ops: u64 = records.iter().map(|r| r.op_count()).sum();
        let total_subject_elapsed: Duration = records.iter().map(|r| r.subject_elapsed()).sum();
        let avg_subject_throughput = throughput(total_subject_ops, total_subject_elapsed);

        let with_reference: Vec<(u64, Duration)> = records
            .iter()
            .filter_map(|r| r.reference_elapsed().map(|e| (r.op_count(), e)))
            .collect();

        let reference = if with_reference.is_empty() {
            None
        } else {
            let total_ops: u64 = with_reference.iter().map(|(ops, _)| ops).sum();
            let total_elapsed: Duration = with_reference.iter().map(|(_, e)| *e).sum();
            Some(ReferenceAggregate {
                total_ops,
                total_elapsed,
                avg_throughput: throughput(total_ops, total_elapsed),
            })
        };

        let overall = match &reference {
            Some(r) if r.avg_throughput > 0.0 => {
                Speedup::from_ratio(avg_subject_throughput / r.avg_throughput)
            }
            _ => Speedup::NotAvailable,
        };

        Self {
            total_subject_ops,
            total_subject_elapsed,
            avg_subject_throughput,
            reference,
            overall,
        }
    }
}

/// One benchmark run over the full catalog
pub struct ComparisonSession<C: Clock = MonotonicClock> {
    subject: Box<dyn KvTarget>,
    reference: Option<Box<dyn KvTarget>>,
    /// Set once the reference has been attached or given up on
    reference_resolved: bool,
    runner: TimingRunner<C>,
    scenarios: &'static [BenchmarkScenario],
    records: Vec<ResultRecord>,
    total_runtime: Option<Duration>,
}

impl ComparisonSession<MonotonicClock> {
    pub fn new(subject: Box<dyn KvTarget>) -> Self {
        Self::with_clock(subject, MonotonicClock)
    }
}

impl<C: Clock> ComparisonSession<C> {
    pub fn with_clock(subject: Box<dyn KvTarget>, clock: C) -> Self {
        Self {
            subject,
            reference: None,
            reference_resolved: false,
            runner: TimingRunner::new(clock),
            scenarios: catalog(),
            records: Vec::new(),
            total_runtime: None,
        }
    }

    /// Run a different scenario list instead of the full catalog
    pub fn with_scenarios(mut self, scenarios: &'static [BenchmarkScenario]) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Attach an already-connected reference target
    pub fn with_reference(mut self, reference: Box<dyn KvTarget>) -> Self {
        self.reference = Some(reference);
        self.reference_resolved = true;
        self
    }

    /// Try to attach a reference target.
    ///
    /// A malformed endpoint is fatal. Credential, connect and ping failures
    /// are logged and leave the session subject-only for good: only the
    /// first call, made before `run_all`, is accepted.
    pub fn connect_reference(
        &mut self,
        endpoint: Option<&str>,
        credentials: &dyn CredentialProvider,
        connector: &dyn ReferenceConnector,
    ) -> Result<bool> {
        if self.reference_resolved || self.total_runtime.is_some() || !self.records.is_empty() {
            return Err(BenchError::ReferenceAlreadyResolved);
        }
        self.reference_resolved = true;

        let Some(raw) = endpoint else {
            info!("No reference endpoint given, running subject only");
            return Ok(false);
        };

        let endpoint: Endpoint = raw.parse()?;

        match Self::open_reference(&endpoint, credentials, connector) {
            Ok((target, authenticated)) => {
                if authenticated {
                    info!("Connected to reference at {} (authenticated)", endpoint);
                } else {
                    info!("Connected to reference at {}", endpoint);
                }
                self.reference = Some(target);
                Ok(true)
            }
            Err(e) => {
                warn!(
                    "Could not connect to reference at {}: {}. Running subject only",
                    endpoint, e
                );
                Ok(false)
            }
        }
    }

    fn open_reference(
        endpoint: &Endpoint,
        credentials: &dyn CredentialProvider,
        connector: &dyn ReferenceConnector,
    ) -> TargetResult<(Box<dyn KvTarget>, bool)> {
        let password = credentials.password()?;
        let mut target = connector.connect(endpoint, password.as_deref())?;
        target.ping()?;
        Ok((target, password.is_some()))
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn subject_name(&self) -> &str {
        self.subject.name()
    }

    pub fn reference_name(&self) -> Option<&str> {
        self.reference.as_deref().map(|r| r.name())
    }

    /// Execute every scenario in order, returning the total wall time
    pub fn run_all(&mut self, observer: &mut dyn SessionObserver) -> Result<Duration> {
        if self.total_runtime.is_some() || !self.records.is_empty() {
            return Err(BenchError::SessionAlreadyRun);
        }

        let scenarios = self.scenarios;
        let total = scenarios.len();
        let started = self.runner.clock().now();

        for (i, scenario) in scenarios.iter().enumerate() {
            let index = i + 1;
            observer.scenario_started(index, total, scenario);

            let subject_elapsed = self
                .runner
                .run(
                    self.subject.as_mut(),
                    scenario.subject_program,
                    scenario.op_count,
                )
                .map_err(|source| BenchError::Subject {
                    scenario: scenario.name,
                    source,
                })?;

            let reference_elapsed = match (self.reference.as_deref_mut(), scenario.reference_program) {
                (Some(reference), Some(program)) => {
                    match self.runner.run(reference, program, scenario.op_count) {
                        Ok(elapsed) => Some(elapsed),
                        Err(e) => {
                            warn!("Reference failed during {}: {}", scenario.name, e);
                            None
                        }
                    }
                }
                _ => None,
            };

            let record = ResultRecord::new(
                scenario.name,
                scenario.op_count,
                subject_elapsed,
                reference_elapsed,
            );
            debug!(
                "{}: subject={:?} reference={:?}",
                record.name(),
                record.subject_elapsed(),
                record.reference_elapsed()
            );

            self.records.push(record);
            if let Some(record) = self.records.last() {
                observer.scenario_finished(index, total, record);
            }
        }

        let runtime = self
            .runner
            .clock()
            .now()
            .saturating_duration_since(started);
        self.total_runtime = Some(runtime);
        Ok(runtime)
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Wall time of the last `run_all`
    pub fn total_runtime(&self) -> Option<Duration> {
        self.total_runtime
    }

    pub fn aggregate(&self) -> Aggregate {
        Aggregate::from_records(&self.records)
    }
}
