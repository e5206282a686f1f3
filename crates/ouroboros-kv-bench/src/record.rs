//! Per-scenario measurements and the speedup between targets

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Operations per second, or 0 for a zero-length interval
pub fn throughput(op_count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        op_count as f64 / secs
    } else {
        0.0
    }
}

/// Relative performance of the subject against the reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "factor", rename_all = "snake_case")]
pub enum Speedup {
    Faster(f64),
    Slower(f64),
    NotAvailable,
}

impl Speedup {
    /// From a subject/reference ratio where values above 1 favor the subject
    pub fn from_ratio(ratio: f64) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            Speedup::NotAvailable
        } else if ratio >= 1.0 {
            Speedup::Faster(ratio)
        } else {
            Speedup::Slower(1.0 / ratio)
        }
    }

    /// From the two elapsed times of one scenario
    pub fn from_elapsed(subject: Duration, reference: Option<Duration>) -> Self {
        match reference {
            Some(reference) if !subject.is_zero() => {
                Self::from_ratio(reference.as_secs_f64() / subject.as_secs_f64())
            }
            _ => Speedup::NotAvailable,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Speedup::NotAvailable)
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speedup::Faster(x) => write!(f, "{:.2}x faster", x),
            Speedup::Slower(x) => write!(f, "{:.2}x slower", x),
            Speedup::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Timing outcome of one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    name: &'static str,
    op_count: u64,
    subject_elapsed: Duration,
    reference_elapsed: Option<Duration>,
}

impl ResultRecord {
    pub fn new(
        name: &'static str,
        op_count: u64,
        subject_elapsed: Duration,
        reference_elapsed: Option<Duration>,
    ) -> Self {
        debug_assert!(op_count > 0, "scenario {} has no operations", name);
        Self {
            name,
            op_count,
            subject_elapsed,
            reference_elapsed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn op_count(&self) -> u64 {
        self.op_count
    }

    pub fn subject_elapsed(&self) -> Duration {
        self.subject_elapsed
    }

    /// `None` when there was no reference or its leg failed
    pub fn reference_elapsed(&self) -> Option<Duration> {
        self.reference_elapsed
    }

    pub fn subject_throughput(&self) -> f64 {
        throughput(self.op_count, self.subject_elapsed)
    }

    pub fn reference_throughput(&self) -> Option<f64> {
        self.reference_elapsed
            .map(|elapsed| throughput(self.op_count, elapsed))
    }

    pub fn speedup(&self) -> Speedup {
        Speedup::from_elapsed(self.subject_elapsed, self.reference_elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let record = ResultRecord::new("SET", 10_000, Duration::from_millis(100), None);
        assert!((record.subject_throughput() - 100_000.0).abs() < 1e-6);
        assert_eq!(record.reference_throughput(), None);
    }

    #[test]
    fn test_zero_elapsed_throughput() {
        let record = ResultRecord::new("GET", 10, Duration::ZERO, Some(Duration::ZERO));
        assert_eq!(record.subject_throughput(), 0.0);
        assert_eq!(record.reference_throughput(), Some(0.0));
        assert_eq!(record.speedup(), Speedup::NotAvailable);
    }

    #[test]
    fn test_speedup_text() {
        let faster = ResultRecord::new(
            "SET",
            100,
            Duration::from_millis(10),
            Some(Duration::from_millis(20)),
        );
        assert_eq!(faster.speedup().to_string(), "2.00x faster");

        let slower = ResultRecord::new(
            "SET",
            100,
            Duration::from_millis(30),
            Some(Duration::from_millis(20)),
        );
        assert_eq!(slower.speedup().to_string(), "1.50x slower");

        let equal = ResultRecord::new(
            "SET",
            100,
            Duration::from_millis(20),
            Some(Duration::from_millis(20)),
        );
        assert_eq!(equal.speedup().to_string(), "1.00x faster");

        let missing = ResultRecord::new("SET", 100, Duration::from_millis(20), None);
        assert_eq!(missing.speedup().to_string(), "N/A");
    }

    #[test]
    fn test_from_ratio_rejects_degenerate() {
        assert_eq!(Speedup::from_ratio(0.0), Speedup::NotAvailable);
        assert_eq!(Speedup::from_ratio(f64::INFINITY), Speedup::NotAvailable);
        assert_eq!(Speedup::from_ratio(f64::NAN), Speedup::NotAvailable);
        assert_eq!(Speedup::from_ratio(0.5), Speedup::Slower(2.0));
    }
}
