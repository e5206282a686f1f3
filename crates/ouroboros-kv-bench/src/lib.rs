//! Throughput comparison harness for ouroboros-kv
//!
//! Runs a fixed catalog of Redis-style commands against the embedded
//! `KvEngine` and, optionally, a Redis-protocol server, then reports
//! per-scenario and overall throughput.
//!
//! # Example
//! ```no_run
//! use ouroboros_kv_bench::{BenchmarkReport, ComparisonSession, EmbeddedTarget, NoopObserver, Reporter};
//!
//! let mut session = ComparisonSession::new(Box::new(EmbeddedTarget::default()));
//! session.run_all(&mut NoopObserver).unwrap();
//! println!("{}", Reporter::console().generate(&BenchmarkReport::from_session(&session)));
//! ```

pub mod adapters;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod record;
pub mod report;
pub mod scenario;
pub mod session;
pub mod target;
pub mod timing;

pub use adapters::{EmbeddedTarget, RedisConnector, RedisTarget, ReferenceConnector};
pub use config::{BenchConfig, PasswordSource};
pub use credentials::{CredentialProvider, NoCredentials, PromptPassword, StaticPassword};
pub use endpoint::Endpoint;
pub use error::{BenchError, Result};
pub use record::{ResultRecord, Speedup};
pub use report::{BenchmarkReport, ReportFormat, Reporter};
pub use scenario::{catalog, BenchmarkScenario, Program};
pub use session::{Aggregate, ComparisonSession, NoopObserver, ReferenceAggregate, SessionObserver};
pub use target::{KvTarget, TargetError, TargetResult};
pub use timing::{Clock, ManualClock, MonotonicClock, TimingRunner};
