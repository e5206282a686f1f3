//! High-performance, multi-core key-value store for ouroboros
//!
//! # Features
//! - Sharded storage engine for multi-core scalability
//! - High-precision numeric types (Decimal, f64, i64)
//! - Redis-style collections: lists, sets and sorted sets
//! - Per-key TTLs and glob key listing

pub mod engine;
pub mod error;
pub mod glob;
pub mod types;

pub use engine::KvEngine;
pub use error::KvError;
pub use types::{KvKey, KvValue, SortedSet};

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, KvError>;
