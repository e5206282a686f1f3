//! KV store data types
//!
//! Supports high-precision numerics and Redis-compatible collections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Key type for KV store (max 256 UTF-8 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey(String);

impl KvKey {
    /// Create a new key, validating length constraints
    pub fn new(key: impl Into<String>) -> Result<Self, crate::error::KvError> {
        let key = key.into();
        if key.len() > 256 {
            return Err(crate::error::KvError::KeyTooLong(key.len()));
        }
        if key.is_empty() {
            return Err(crate::error::KvError::EmptyKey);
        }
        Ok(Self(key))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Value types supported by the KV store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KvValue {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// 128-bit fixed-point decimal for financial precision
    Decimal(Decimal),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Double-ended list of strings (LPUSH/RPUSH/LPOP/LRANGE)
    List(VecDeque<String>),
    /// Unordered set of unique strings
    Set(HashSet<String>),
    /// Members ordered by score
    SortedSet(SortedSet),
    /// Null/None value
    Null,
}

impl KvValue {
    /// Type name as reported in type mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            KvValue::Int(_) => "Int",
            KvValue::Float(_) => "Float",
            KvValue::Decimal(_) => "Decimal",
            KvValue::String(_) => "String",
            KvValue::Bytes(_) => "Bytes",
            KvValue::List(_) => "List",
            KvValue::Set(_) => "Set",
            KvValue::SortedSet(_) => "SortedSet",
            KvValue::Null => "Null",
        }
    }

    /// String form of a scalar value, the way GET returns it.
    ///
    /// Collections have no string form and return `None`.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            KvValue::Int(n) => Some(n.to_string()),
            KvValue::Float(f) => Some(f.to_string()),
            KvValue::Decimal(d) => Some(d.to_string()),
            KvValue::String(s) => Some(s.clone()),
            KvValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            KvValue::Null => Some(String::new()),
            KvValue::List(_) | KvValue::Set(_) | KvValue::SortedSet(_) => None,
        }
    }
}

/// A member of a sorted set, ordered by score then by member name
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoredMember {
    score: f64,
    member: String,
}

impl PartialEq for ScoredMember {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredMember {}

impl PartialOrd for ScoredMember {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredMember {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.member.cmp(&other.member))
    }
}

/// Sorted set: unique members with a score index and a score-ordered view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortedSet {
    scores: HashMap<String, f64>,
    ordered: BTreeSet<ScoredMember>,
}

impl PartialEq for SortedSet {
    fn eq(&self, other: &Self) -> bool {
        self.ordered == other.ordered
    }
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a member. Returns true if the member is new.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(old) => {
                self.ordered.remove(&ScoredMember {
                    score: old,
                    member: member.to_string(),
                });
                self.ordered.insert(ScoredMember {
                    score,
                    member: member.to_string(),
                });
                false
            }
            None => {
                self.ordered.insert(ScoredMember {
                    score,
                    member: member.to_string(),
                });
                true
            }
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members in ascending score order
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(|m| m.member.as_str())
    }
}
