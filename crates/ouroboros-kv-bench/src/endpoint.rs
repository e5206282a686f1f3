//! `host:port` endpoint parsing

use crate::error::BenchError;
use std::fmt;
use std::str::FromStr;

/// Network address of a reference server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| BenchError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        // Split on the last colon so bracket-free IPv6 hosts fail on the port
        let (host, port) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected host:port"))?;

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| invalid("port must be an integer between 0 and 65535"))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
