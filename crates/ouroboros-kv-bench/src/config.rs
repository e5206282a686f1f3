//! Resolved settings for one benchmark run

use crate::adapters::redis::DEFAULT_CONNECT_TIMEOUT;
use crate::report::ReportFormat;
use std::time::Duration;

/// Default shard count for the embedded engine
pub const DEFAULT_SHARDS: usize = 256;

/// How the reference password is obtained
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PasswordSource {
    #[default]
    None,
    Static(String),
    Prompt,
}

/// Benchmark configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// `host:port` of the reference server, `None` for subject-only runs
    pub reference_endpoint: Option<String>,
    pub password: PasswordSource,
    pub shards: usize,
    pub connect_timeout: Duration,
    pub format: ReportFormat,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            reference_endpoint: None,
            password: PasswordSource::None,
            shards: DEFAULT_SHARDS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            format: ReportFormat::Console,
        }
    }
}

impl BenchConfig {
    pub fn with_reference(mut self, endpoint: impl Into<String>) -> Self {
        self.reference_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_password(mut self, password: PasswordSource) -> Self {
        self.password = password;
        self
    }

    /// Shard count, at least 1
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }
}
