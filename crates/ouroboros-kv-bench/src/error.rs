use crate::target::TargetError;
use thiserror::Error;

/// Errors that end a benchmark run
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Subject failed during {scenario}: {source}")]
    Subject {
        scenario: &'static str,
        #[source]
        source: TargetError,
    },

    #[error("Session has already been run")]
    SessionAlreadyRun,

    #[error("Reference target has already been resolved for this session")]
    ReferenceAlreadyResolved,
}

pub type Result<T> = std::result::Result<T, BenchError>;
