//! Target capability set
//!
//! Every store the harness measures implements [`KvTarget`]. The timing
//! runner and the comparison session are written once against this trait.

use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by a target while executing a command
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Store error: {0}")]
    Store(#[from] ouroboros_kv::KvError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("{0}")]
    Other(String),
}

pub type TargetResult<T> = std::result::Result<T, TargetError>;

/// Command surface shared by the embedded store and networked servers.
///
/// Methods take `&mut self`: network targets own a single connection and
/// every call is one request/response round trip.
pub trait KvTarget {
    /// Display name used in progress output and reports
    fn name(&self) -> &str;

    /// Liveness check
    fn ping(&mut self) -> TargetResult<()>;

    fn set(&mut self, key: &str, value: &str) -> TargetResult<()>;

    fn get(&mut self, key: &str) -> TargetResult<Option<String>>;

    /// Returns the number of keys removed
    fn delete(&mut self, keys: &[&str]) -> TargetResult<u64>;

    /// Increment by one, returns the new value
    fn incr(&mut self, key: &str) -> TargetResult<i64>;

    /// Returns the list length after the push
    fn lpush(&mut self, key: &str, values: &[&str]) -> TargetResult<u64>;

    /// Returns the list length after the push
    fn rpush(&mut self, key: &str, values: &[&str]) -> TargetResult<u64>;

    fn lpop(&mut self, key: &str) -> TargetResult<Option<String>>;

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> TargetResult<Vec<String>>;

    /// Returns the number of members that were new
    fn sadd(&mut self, key: &str, members: &[&str]) -> TargetResult<u64>;

    fn smembers(&mut self, key: &str) -> TargetResult<HashSet<String>>;

    fn sismember(&mut self, key: &str, member: &str) -> TargetResult<bool>;

    /// Returns the number of members that were new
    fn zadd(&mut self, key: &str, members: &[(&str, f64)]) -> TargetResult<u64>;

    fn zrange(&mut self, key: &str, start: i64, stop: i64) -> TargetResult<Vec<String>>;

    fn zscore(&mut self, key: &str, member: &str) -> TargetResult<Option<f64>>;

    /// Returns false if the key does not exist
    fn expire(&mut self, key: &str, seconds: u64) -> TargetResult<bool>;

    /// Returns how many of the given keys exist
    fn exists(&mut self, keys: &[&str]) -> TargetResult<u64>;

    fn keys(&mut self, pattern: &str) -> TargetResult<Vec<String>>;

    /// Remove every key
    fn flushall(&mut self) -> TargetResult<()>;
}
