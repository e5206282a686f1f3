//! KV Benchmark
//!
//! Compares ouroboros-kv against an optional Redis-protocol server.

use anyhow::Context;
use clap::Parser;
use ouroboros_kv_bench::report::format_number;
use ouroboros_kv_bench::{
    BenchConfig, BenchmarkReport, BenchmarkScenario, ComparisonSession, CredentialProvider,
    EmbeddedTarget, NoCredentials, NoopObserver, PasswordSource, PromptPassword, RedisConnector,
    ReportFormat, Reporter, ResultRecord, SessionObserver, StaticPassword,
};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "kv-bench")]
#[command(about = "Compare ouroboros-kv throughput against a Redis-protocol server")]
struct Args {
    /// Reference server as host:port (omit to benchmark ouroboros-kv alone)
    #[arg(long)]
    redis: Option<String>,

    /// Reference password; prompts when given without a value
    #[arg(long, num_args = 0..=1)]
    redis_password: Option<Option<String>>,

    /// Number of shards for the embedded engine
    #[arg(short, long, default_value = "256")]
    shards: usize,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Console)]
    format: ReportFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Reference connect timeout in milliseconds
    #[arg(long, default_value = "2000")]
    connect_timeout_ms: u64,
}

impl Args {
    fn into_config(self) -> BenchConfig {
        let password = match self.redis_password {
            None => PasswordSource::None,
            Some(None) => PasswordSource::Prompt,
            Some(Some(password)) => PasswordSource::Static(password),
        };

        let config = BenchConfig::default()
            .with_password(password)
            .with_shards(self.shards)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_format(self.format);

        match self.redis {
            Some(endpoint) => config.with_reference(endpoint),
            None => config,
        }
    }
}

/// Streams per-scenario progress to stdout
struct ConsoleProgress;

impl SessionObserver for ConsoleProgress {
    fn scenario_started(&mut self, index: usize, total: usize, scenario: &BenchmarkScenario) {
        println!(
            "\n[{}/{}] {} Operations ({} operations)",
            index,
            total,
            scenario.name,
            format_number(scenario.op_count as f64)
        );
    }

    fn scenario_finished(&mut self, _index: usize, _total: usize, record: &ResultRecord) {
        println!(
            "  ouroboros-kv: {:>12} ops/sec ({:.3}s)",
            format_number(record.subject_throughput()),
            record.subject_elapsed().as_secs_f64()
        );

        if let (Some(ops), Some(elapsed)) =
            (record.reference_throughput(), record.reference_elapsed())
        {
            println!(
                "  reference:    {:>12} ops/sec ({:.3}s)",
                format_number(ops),
                elapsed.as_secs_f64()
            );
            println!("  => {}", record.speedup());
        }
    }
}

fn credentials(source: &PasswordSource) -> Box<dyn CredentialProvider> {
    match source {
        PasswordSource::None => Box::new(NoCredentials),
        PasswordSource::Static(password) => Box::new(StaticPassword::new(password.clone())),
        PasswordSource::Prompt => Box::new(PromptPassword::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let config = args.into_config();
    info!("Shards: {}", config.shards);

    let subject = EmbeddedTarget::with_shards(config.shards);
    let mut session = ComparisonSession::new(Box::new(subject));

    let provider = credentials(&config.password);
    let connector = RedisConnector::new(config.connect_timeout);
    session
        .connect_reference(
            config.reference_endpoint.as_deref(),
            provider.as_ref(),
            &connector,
        )
        .context("invalid reference configuration")?;

    let runtime = match config.format {
        ReportFormat::Console => session.run_all(&mut ConsoleProgress),
        ReportFormat::Json => session.run_all(&mut NoopObserver),
    }
    .context("benchmark aborted")?;
    info!("Benchmark finished in {:.2}s", runtime.as_secs_f64());

    let report = BenchmarkReport::from_session(&session);
    println!("{}", Reporter::new(config.format).generate(&report));

    Ok(())
}
