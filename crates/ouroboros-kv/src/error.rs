//! KV store error types

use thiserror::Error;

/// Errors specific to KV store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KvError {
    #[error("Key too long: {0} characters (max 256)")]
    KeyTooLong(usize),

    #[error("Empty key not allowed")]
    EmptyKey,

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Value is not an integer or out of range")]
    NotAnInteger,
}

impl KvError {
    pub(crate) fn type_mismatch(expected: &str, actual: &str) -> Self {
        KvError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
