//! Timing protocol: flush, read clock, run program, read clock

use crate::scenario::Program;
use crate::target::{KvTarget, TargetError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same offset, so a test can hand one copy to the runner
/// and advance another from inside a mock target.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // Saturates instead of wrapping
        let _ = self
            .offset_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            });
    }

    /// Total time advanced so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }
}

/// Measures one program against one target
#[derive(Debug, Clone, Default)]
pub struct TimingRunner<C: Clock = MonotonicClock> {
    clock: C,
}

impl<C: Clock> TimingRunner<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Flush the target, then time `program` to completion.
    ///
    /// The flush is outside the measured interval. Errors from either step
    /// propagate unchanged.
    pub fn run(
        &self,
        target: &mut dyn KvTarget,
        program: Program,
        op_count: u64,
    ) -> Result<Duration, TargetError> {
        target.flushall()?;

        let start = self.clock.now();
        program(target, op_count)?;
        let end = self.clock.now();

        Ok(end.saturating_duration_since(start))
    }
}
