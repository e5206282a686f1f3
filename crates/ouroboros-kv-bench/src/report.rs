//! Benchmark reporter - renders a finished session as text or JSON

use crate::record::ResultRecord;
use crate::session::{Aggregate, ComparisonSession};
use crate::timing::Clock;
use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::time::Duration;

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned table for the terminal
    #[default]
    Console,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Console => write!(f, "console"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// One scenario row
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub name: &'static str,
    pub op_count: u64,
    pub subject_elapsed_secs: f64,
    pub subject_ops_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_elapsed_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_ops_per_sec: Option<f64>,
    pub speedup: String,
}

impl From<&ResultRecord> for RecordSummary {
    fn from(record: &ResultRecord) -> Self {
        Self {
            name: record.name(),
            op_count: record.op_count(),
            subject_elapsed_secs: record.subject_elapsed().as_secs_f64(),
            subject_ops_per_sec: record.subject_throughput(),
            reference_elapsed_secs: record.reference_elapsed().map(|d| d.as_secs_f64()),
            reference_ops_per_sec: record.reference_throughput(),
            speedup: record.speedup().to_string(),
        }
    }
}

/// Totals for one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetTotals {
    pub total_ops: u64,
    pub total_elapsed_secs: f64,
    pub avg_ops_per_sec: f64,
}

/// Serializable view of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub records: Vec<RecordSummary>,
    pub subject_totals: TargetTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_totals: Option<TargetTotals>,
    pub overall: String,
    #[serde(skip)]
    overall_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_runtime_secs: Option<f64>,
}

impl BenchmarkReport {
    pub fn new(
        subject: impl Into<String>,
        reference: Option<String>,
        records: &[ResultRecord],
        aggregate: &Aggregate,
    ) -> Self {
        Self {
            subject: subject.into(),
            reference,
            records: records.iter().map(RecordSummary::from).collect(),
            subject_totals: TargetTotals {
                total_ops: aggregate.total_subject_ops,
                total_elapsed_secs: aggregate.total_subject_elapsed.as_secs_f64(),
                avg_ops_per_sec: aggregate.avg_subject_throughput,
            },
            reference_totals: aggregate.reference.as_ref().map(|r| TargetTotals {
                total_ops: r.total_ops,
                total_elapsed_secs: r.total_elapsed.as_secs_f64(),
                avg_ops_per_sec: r.avg_throughput,
            }),
            overall: aggregate.overall.to_string(),
            overall_available: aggregate.overall.is_available(),
            total_runtime_secs: None,
        }
    }

    /// Snapshot a session after `run_all`
    pub fn from_session<C: Clock>(session: &ComparisonSession<C>) -> Self {
        let report = Self::new(
            session.subject_name(),
            session.reference_name().map(str::to_string),
            session.records(),
            &session.aggregate(),
        );
        match session.total_runtime() {
            Some(runtime) => report.with_total_runtime(runtime),
            None => report,
        }
    }

    pub fn with_total_runtime(mut self, runtime: Duration) -> Self {
        self.total_runtime_secs = Some(runtime.as_secs_f64());
        self
    }
}

/// Thousands separators, fractional part dropped
pub fn format_number(n: f64) -> String {
    let s = (n.max(0.0) as u64).to_string();
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

const RULE_WIDTH: usize = 78;

#[derive(Debug, Default, Clone, Copy)]
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn console() -> Self {
        Self::new(ReportFormat::Console)
    }

    pub fn json() -> Self {
        Self::new(ReportFormat::Json)
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Render the report in the configured format
    pub fn generate(&self, report: &BenchmarkReport) -> String {
        match self.format {
            ReportFormat::Console => {
                let mut output = String::new();
                // Writing into a String cannot fail
                let _ = self.write_console(&mut output, report);
                output
            }
            ReportFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }

    fn write_console(&self, out: &mut String, report: &BenchmarkReport) -> std::fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let thin = "-".repeat(RULE_WIDTH);
        let reference = report.reference.as_deref().unwrap_or("reference");
        let subject_col = format!("{} (ops/s)", report.subject);
        let reference_col = format!("{} (ops/s)", reference);

        writeln!(out)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "BENCHMARK SUMMARY")?;
        writeln!(out, "{}", rule)?;
        writeln!(
            out,
            "{:<12} {:>22} {:>22} {:>18}",
            "Operation", subject_col, reference_col, "Result"
        )?;
        writeln!(out, "{}", thin)?;

        for record in &report.records {
            let reference_ops = record
                .reference_ops_per_sec
                .map(format_number)
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(
                out,
                "{:<12} {:>22} {:>22} {:>18}",
                record.name,
                format_number(record.subject_ops_per_sec),
                reference_ops,
                record.speedup
            )?;
        }

        writeln!(out, "{}", thin)?;
        writeln!(out)?;
        writeln!(out, "{} statistics:", report.subject)?;
        Self::write_totals(out, &report.subject_totals)?;

        if let Some(totals) = &report.reference_totals {
            writeln!(out)?;
            writeln!(out, "{} statistics:", reference)?;
            Self::write_totals(out, totals)?;
            writeln!(out)?;
            if report.overall_available {
                writeln!(
                    out,
                    "Overall: {} is {} than {}",
                    report.subject, report.overall, reference
                )?;
            } else {
                writeln!(out, "Overall: {}", report.overall)?;
            }
        }

        if let Some(secs) = report.total_runtime_secs {
            writeln!(out)?;
            writeln!(out, "Total benchmark time: {:.2}s", secs)?;
        }
        writeln!(out, "{}", rule)?;
        Ok(())
    }

    fn write_totals(out: &mut String, totals: &TargetTotals) -> std::fmt::Result {
        writeln!(out, "  Total operations: {}", format_number(totals.total_ops as f64))?;
        writeln!(out, "  Total time:       {:.3}s", totals.total_elapsed_secs)?;
        writeln!(
            out,
            "  Avg throughput:   {} ops/sec",
            format_number(totals.avg_ops_per_sec)
        )
    }
}
