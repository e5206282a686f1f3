//! Sharded KV storage engine
//!
//! Partitions keyspace into multiple shards for multi-core scalability.
//! Each shard uses RwLock for concurrent reads and exclusive writes.

use crate::error::KvError;
use crate::glob::glob_match;
use crate::types::{KvKey, KvValue, SortedSet};
use parking_lot::RwLock;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

/// Default number of shards (power of 2 for efficient modulo)
const DEFAULT_NUM_SHARDS: usize = 256;

/// Entry in the KV store with metadata
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value
    pub value: KvValue,
    /// Optional expiration time (TTL)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Create a new entry
    pub fn new(value: KvValue, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    /// Check if entry has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Instant::now() >= exp).unwrap_or(false)
    }
}

/// Collections are removed from the keyspace once they become empty
fn is_empty_collection(value: &KvValue) -> bool {
    match value {
        KvValue::List(items) => items.is_empty(),
        KvValue::Set(members) => members.is_empty(),
        KvValue::SortedSet(zset) => zset.is_empty(),
        _ => false,
    }
}

/// Resolve Redis-style inclusive `start..=stop` indices against a length.
///
/// Negative indices count from the end. Returns `None` for an empty range.
fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start > stop || start >= len || stop < 0 {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

/// A single shard containing a portion of the keyspace
pub struct Shard {
    data: RwLock<HashMap<String, Entry>>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Get a value by key (returns None if expired)
    pub fn get(&self, key: &str) -> Option<Entry> {
        let guard = self.data.read();
        guard.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.clone())
            }
        })
    }

    /// Run `f` against the live value at `key` under a read lock
    fn read<T>(&self, key: &str, f: impl FnOnce(Option<&KvValue>) -> T) -> T {
        let guard = self.data.read();
        let value = guard
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| &entry.value);
        f(value)
    }

    /// Run `f` against the live value at `key` under a write lock.
    ///
    /// A missing (or expired) key is created from `init` when given, otherwise
    /// `f` is skipped and `Ok(None)` returned. Collections left empty by `f`
    /// are removed.
    fn update<T>(
        &self,
        key: &str,
        init: Option<KvValue>,
        f: impl FnOnce(&mut KvValue) -> Result<T, KvError>,
    ) -> Result<Option<T>, KvError> {
        let mut guard = self.data.write();

        if guard.get(key).map(|e| e.is_expired()).unwrap_or(false) {
            guard.remove(key);
        }

        let entry = match guard.entry(key.to_string()) {
            MapEntry::Occupied(occupied) => occupied.into_mut(),
            MapEntry::Vacant(vacant) => match init {
                Some(init) => vacant.insert(Entry::new(init, None)),
                None => return Ok(None),
            },
        };

        let result = f(&mut entry.value);
        if is_empty_collection(&entry.value) {
            guard.remove(key);
        }

        result.map(Some)
    }

    /// Set a value with optional TTL
    pub fn set(&self, key: String, value: KvValue, ttl: Option<Duration>) -> Option<Entry> {
        let mut guard = self.data.write();
        guard.insert(key, Entry::new(value, ttl))
    }

    /// Delete a key, returns the old entry if it existed and was live
    pub fn delete(&self, key: &str) -> Option<Entry> {
        let mut guard = self.data.write();
        guard.remove(key).filter(|entry| !entry.is_expired())
    }

    /// Check if key exists (and not expired)
    pub fn exists(&self, key: &str) -> bool {
        let guard = self.data.read();
        guard.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }

    /// Atomic increment for Int values (and strings holding an integer)
    pub fn incr(&self, key: &str, delta: i64) -> Result<i64, KvError> {
        let result = self.update(key, Some(KvValue::Int(0)), |value| {
            let current = match value {
                KvValue::Int(n) => *n,
                KvValue::String(s) => s.parse::<i64>().map_err(|_| KvError::NotAnInteger)?,
                other => return Err(KvError::type_mismatch("Int", other.type_name())),
            };
            let next = current.checked_add(delta).ok_or(KvError::NotAnInteger)?;
            *value = KvValue::Int(next);
            Ok(next)
        })?;
        Ok(result.unwrap_or(delta))
    }

    /// Set (or replace) the expiration of a live key
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        let mut guard = self.data.write();
        match guard.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                true
            }
            _ => false,
        }
    }

    /// Remaining time to live, `None` for missing or persistent keys
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let guard = self.data.read();
        guard
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(|entry| entry.expires_at)
            .map(|exp| exp.saturating_duration_since(Instant::now()))
    }

    /// Live keys matching a glob pattern
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let guard = self.data.read();
        guard
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// Get entry count (including expired - for stats)
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Remove all expired entries, returns count removed
    pub fn cleanup_expired(&self) -> usize {
        let mut guard = self.data.write();
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired());
        before - guard.len()
    }
}

impl Default for Shard {
    fn default() -> Self {
        Self::new()
    }
}

/// High-performance sharded KV engine
pub struct KvEngine {
    shards: Vec<Shard>,
    num_shards: usize,
}

impl KvEngine {
    /// Create a new KV engine with default number of shards (256)
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_NUM_SHARDS)
    }

    /// Create a new KV engine with specified number of shards
    pub fn with_shards(num_shards: usize) -> Self {
        let num_shards = num_shards.max(1);
        let shards = (0..num_shards).map(|_| Shard::new()).collect();
        Self { shards, num_shards }
    }

    /// Get the shard for a given key
    #[inline]
    fn shard_for_key(&self, key: &str) -> &Shard {
        let hash = Self::hash_key(key);
        let idx = hash as usize % self.num_shards;
        &self.shards[idx]
    }

    /// Hash a key to u64
    #[inline]
    fn hash_key(key: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Get a value by key
    pub fn get(&self, key: &KvKey) -> Option<KvValue> {
        self.shard_for_key(key.as_str())
            .get(key.as_str())
            .map(|entry| entry.value)
    }

    /// Get a scalar value in its string form (GET semantics)
    pub fn get_string(&self, key: &KvKey) -> Result<Option<String>, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(None),
            Some(value) => value
                .to_scalar_string()
                .map(Some)
                .ok_or_else(|| KvError::type_mismatch("String", value.type_name())),
        })
    }

    /// Set a value with optional TTL
    pub fn set(&self, key: &KvKey, value: KvValue, ttl: Option<Duration>) {
        self.shard_for_key(key.as_str())
            .set(key.as_str().to_string(), value, ttl);
    }

    /// Delete a key
    pub fn delete(&self, key: &KvKey) -> bool {
        self.shard_for_key(key.as_str())
            .delete(key.as_str())
            .is_some()
    }

    /// Check if key exists
    pub fn exists(&self, key: &KvKey) -> bool {
        self.shard_for_key(key.as_str()).exists(key.as_str())
    }

    /// Atomic increment
    pub fn incr(&self, key: &KvKey, delta: i64) -> Result<i64, KvError> {
        self.shard_for_key(key.as_str()).incr(key.as_str(), delta)
    }

    // ==================== Batch Operations ====================

    /// Delete multiple keys (MDEL)
    ///
    /// # Returns
    /// The number of keys that were actually deleted (existed before deletion).
    ///
    /// # Example
    /// ```
    /// use ouroboros_kv::engine::KvEngine;
    /// use ouroboros_kv::types::{KvKey, KvValue};
    ///
    /// let engine = KvEngine::new();
    /// let key1 = KvKey::new("key1").unwrap();
    /// let key2 = KvKey::new("key2").unwrap();
    /// let key3 = KvKey::new("key3").unwrap();
    ///
    /// engine.set(&key1, KvValue::Int(1), None);
    /// engine.set(&key2, KvValue::Int(2), None);
    ///
    /// let keys = vec![&key1, &key2, &key3];
    /// let deleted = engine.mdel(&keys);
    /// assert_eq!(deleted, 2); // key1 and key2 deleted, key3 didn't exist
    /// ```
    pub fn mdel(&self, keys: &[&KvKey]) -> usize {
        keys.iter()
            .filter(|key| {
                self.shard_for_key(key.as_str())
                    .delete(key.as_str())
                    .is_some()
            })
            .count()
    }

    /// Check if multiple keys exist (MEXISTS)
    ///
    /// Returns a vector of booleans indicating whether each key exists.
    pub fn mexists(&self, keys: &[&KvKey]) -> Vec<bool> {
        keys.iter()
            .map(|key| self.exists(key))
            .collect()
    }

    // ==================== Lists ====================

    /// Prepend values to a list, returns the new length.
    ///
    /// Each value is pushed to the head in turn, so `lpush(k, [a, b])`
    /// leaves `b` first.
    pub fn lpush(&self, key: &KvKey, values: &[&str]) -> Result<usize, KvError> {
        self.push(key, values, true)
    }

    /// Append values to a list, returns the new length
    pub fn rpush(&self, key: &KvKey, values: &[&str]) -> Result<usize, KvError> {
        self.push(key, values, false)
    }

    fn push(&self, key: &KvKey, values: &[&str], front: bool) -> Result<usize, KvError> {
        let len = self.shard_for_key(key.as_str()).update(
            key.as_str(),
            Some(KvValue::List(VecDeque::new())),
            |value| match value {
                KvValue::List(items) => {
                    for v in values {
                        if front {
                            items.push_front((*v).to_string());
                        } else {
                            items.push_back((*v).to_string());
                        }
                    }
                    Ok(items.len())
                }
                other => Err(KvError::type_mismatch("List", other.type_name())),
            },
        )?;
        Ok(len.unwrap_or(0))
    }

    /// Remove and return the head of a list
    pub fn lpop(&self, key: &KvKey) -> Result<Option<String>, KvError> {
        let popped = self
            .shard_for_key(key.as_str())
            .update(key.as_str(), None, |value| match value {
                KvValue::List(items) => Ok(items.pop_front()),
                other => Err(KvError::type_mismatch("List", other.type_name())),
            })?;
        Ok(popped.flatten())
    }

    /// Inclusive range of list items, negative indices count from the tail
    pub fn lrange(&self, key: &KvKey, start: i64, stop: i64) -> Result<Vec<String>, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(Vec::new()),
            Some(KvValue::List(items)) => Ok(match normalize_range(start, stop, items.len()) {
                Some((from, to)) => items.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }),
            Some(other) => Err(KvError::type_mismatch("List", other.type_name())),
        })
    }

    /// List length (0 for a missing key)
    pub fn llen(&self, key: &KvKey) -> Result<usize, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(0),
            Some(KvValue::List(items)) => Ok(items.len()),
            Some(other) => Err(KvError::type_mismatch("List", other.type_name())),
        })
    }

    // ==================== Sets ====================

    /// Add members to a set, returns how many were new
    pub fn sadd(&self, key: &KvKey, members: &[&str]) -> Result<usize, KvError> {
        let added = self.shard_for_key(key.as_str()).update(
            key.as_str(),
            Some(KvValue::Set(HashSet::new())),
            |value| match value {
                KvValue::Set(set) => Ok(members
                    .iter()
                    .filter(|m| set.insert((**m).to_string()))
                    .count()),
                other => Err(KvError::type_mismatch("Set", other.type_name())),
            },
        )?;
        Ok(added.unwrap_or(0))
    }

    /// All members of a set (empty for a missing key)
    pub fn smembers(&self, key: &KvKey) -> Result<HashSet<String>, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(HashSet::new()),
            Some(KvValue::Set(set)) => Ok(set.clone()),
            Some(other) => Err(KvError::type_mismatch("Set", other.type_name())),
        })
    }

    /// Set membership test
    pub fn sismember(&self, key: &KvKey, member: &str) -> Result<bool, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(false),
            Some(KvValue::Set(set)) => Ok(set.contains(member)),
            Some(other) => Err(KvError::type_mismatch("Set", other.type_name())),
        })
    }

    /// Set cardinality
    pub fn scard(&self, key: &KvKey) -> Result<usize, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(0),
            Some(KvValue::Set(set)) => Ok(set.len()),
            Some(other) => Err(KvError::type_mismatch("Set", other.type_name())),
        })
    }

    // ==================== Sorted Sets ====================

    /// Add or re-score members, returns how many were new
    pub fn zadd(&self, key: &KvKey, members: &[(&str, f64)]) -> Result<usize, KvError> {
        let added = self.shard_for_key(key.as_str()).update(
            key.as_str(),
            Some(KvValue::SortedSet(SortedSet::new())),
            |value| match value {
                KvValue::SortedSet(zset) => Ok(members
                    .iter()
                    .filter(|(member, score)| zset.insert(member, *score))
                    .count()),
                other => Err(KvError::type_mismatch("SortedSet", other.type_name())),
            },
        )?;
        Ok(added.unwrap_or(0))
    }

    /// Members by ascending score within an inclusive rank range
    pub fn zrange(&self, key: &KvKey, start: i64, stop: i64) -> Result<Vec<String>, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(Vec::new()),
            Some(KvValue::SortedSet(zset)) => Ok(match normalize_range(start, stop, zset.len()) {
                Some((from, to)) => zset
                    .members()
                    .skip(from)
                    .take(to - from + 1)
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            }),
            Some(other) => Err(KvError::type_mismatch("SortedSet", other.type_name())),
        })
    }

    /// Score of a member
    pub fn zscore(&self, key: &KvKey, member: &str) -> Result<Option<f64>, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(None),
            Some(KvValue::SortedSet(zset)) => Ok(zset.score(member)),
            Some(other) => Err(KvError::type_mismatch("SortedSet", other.type_name())),
        })
    }

    /// Sorted set cardinality
    pub fn zcard(&self, key: &KvKey) -> Result<usize, KvError> {
        self.shard_for_key(key.as_str()).read(key.as_str(), |value| match value {
            None => Ok(0),
            Some(KvValue::SortedSet(zset)) => Ok(zset.len()),
            Some(other) => Err(KvError::type_mismatch("SortedSet", other.type_name())),
        })
    }

    // ==================== Keyspace ====================

    /// Set a TTL on an existing key, returns false if the key is missing
    pub fn expire(&self, key: &KvKey, ttl: Duration) -> bool {
        self.shard_for_key(key.as_str()).expire(key.as_str(), ttl)
    }

    /// Remaining TTL of a key
    pub fn ttl(&self, key: &KvKey) -> Option<Duration> {
        self.shard_for_key(key.as_str()).ttl(key.as_str())
    }

    /// All live keys matching a glob pattern (unordered)
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        self.shards.iter().flat_map(|s| s.keys(pattern)).collect()
    }

    /// Remove every key from every shard
    pub fn flush_all(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    /// Get total entry count across all shards
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Check if engine is empty
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Get number of shards
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }

    /// Cleanup expired entries across all shards, returns total removed
    pub fn cleanup_expired(&self) -> usize {
        self.shards.iter().map(|s| s.cleanup_expired()).sum()
    }
}

impl Default for KvEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::thread;

    fn key(name: &str) -> KvKey {
        KvKey::new(name).unwrap()
    }

    #[test]
    fn test_basic_set_get() {
        let engine = KvEngine::new();
        let key = key("test_key");

        engine.set(&key, KvValue::String("hello".to_string()), None);

        let result = engine.get(&key);
        assert_eq!(result, Some(KvValue::String("hello".to_string())));
    }

    #[test]
    fn test_get_nonexistent() {
        let engine = KvEngine::new();
        assert_eq!(engine.get(&key("nonexistent")), None);
        assert_eq!(engine.get_string(&key("nonexistent")).unwrap(), None);
    }

    #[test]
    fn test_delete() {
        let engine = KvEngine::new();
        let key = key("to_delete");

        engine.set(&key, KvValue::Int(42), None);
        assert!(engine.exists(&key));

        assert!(engine.delete(&key));
        assert!(!engine.exists(&key));
        assert!(!engine.delete(&key));
    }

    #[test]
    fn test_incr_existing() {
        let engine = KvEngine::new();
        let key = key("counter");

        engine.set(&key, KvValue::Int(10), None);

        assert_eq!(engine.incr(&key, 5).unwrap(), 15);
        assert_eq!(engine.incr(&key, -3).unwrap(), 12);
    }

    #[test]
    fn test_incr_nonexistent() {
        let engine = KvEngine::new();
        let key = key("new_counter");

        assert_eq!(engine.incr(&key, 1).unwrap(), 1);
        assert_eq!(engine.incr(&key, 1).unwrap(), 2);
        assert_eq!(engine.get_string(&key).unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_incr_numeric_string() {
        let engine = KvEngine::new();
        let key = key("numeric");

        engine.set(&key, KvValue::String("41".to_string()), None);
        assert_eq!(engine.incr(&key, 1).unwrap(), 42);
    }

    #[test]
    fn test_incr_not_an_integer() {
        let engine = KvEngine::new();
        let key = key("string_key");

        engine.set(&key, KvValue::String("not a number".to_string()), None);

        let result = engine.incr(&key, 1);
        assert_eq!(result, Err(KvError::NotAnInteger));
    }

    #[test]
    fn test_incr_type_mismatch() {
        let engine = KvEngine::new();
        let key = key("list_key");

        engine.rpush(&key, &["a"]).unwrap();

        let result = engine.incr(&key, 1);
        assert!(matches!(result, Err(KvError::TypeMismatch { .. })));
    }

    #[test]
    fn test_ttl_expiration() {
        let engine = KvEngine::new();
        let key = key("ttl_key");

        // Set with 10ms TTL
        engine.set(&key, KvValue::Int(42), Some(Duration::from_millis(10)));
        assert!(engine.exists(&key));

        thread::sleep(Duration::from_millis(20));

        assert!(!engine.exists(&key));
        assert_eq!(engine.get(&key), None);
    }

    #[test]
    fn test_expire_existing_and_missing() {
        let engine = KvEngine::new();
        let key = key("expire_me");

        assert!(!engine.expire(&key, Duration::from_secs(300)));

        engine.set(&key, KvValue::String("v".to_string()), None);
        assert_eq!(engine.ttl(&key), None);

        assert!(engine.expire(&key, Duration::from_secs(300)));
        let ttl = engine.ttl(&key).unwrap();
        assert!(ttl <= Duration::from_secs(300));
        assert!(ttl > Duration::from_secs(290));
    }

    #[test]
    fn test_decimal_value() {
        let engine = KvEngine::new();
        let key = key("decimal_key");

        let decimal = Decimal::new(12345, 2); // 123.45
        engine.set(&key, KvValue::Decimal(decimal), None);

        assert_eq!(engine.get(&key), Some(KvValue::Decimal(decimal)));
        assert_eq!(engine.get_string(&key).unwrap(), Some("123.45".to_string()));
    }

    #[test]
    fn test_list_push_pop_order() {
        let engine = KvEngine::new();
        let key = key("mylist");

        assert_eq!(engine.rpush(&key, &["b", "c"]).unwrap(), 2);
        assert_eq!(engine.lpush(&key, &["a"]).unwrap(), 3);
        assert_eq!(engine.lrange(&key, 0, -1).unwrap(), vec!["a", "b", "c"]);

        assert_eq!(engine.lpop(&key).unwrap(), Some("a".to_string()));
        assert_eq!(engine.llen(&key).unwrap(), 2);
    }

    #[test]
    fn test_lpush_multiple_reverses() {
        let engine = KvEngine::new();
        let key = key("mylist");

        engine.lpush(&key, &["a", "b", "c"]).unwrap();
        assert_eq!(engine.lrange(&key, 0, -1).unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_lpop_removes_empty_list() {
        let engine = KvEngine::new();
        let key = key("mylist");

        engine.rpush(&key, &["only"]).unwrap();
        assert_eq!(engine.lpop(&key).unwrap(), Some("only".to_string()));
        assert!(!engine.exists(&key));
        assert_eq!(engine.lpop(&key).unwrap(), None);
    }

    #[test]
    fn test_lrange_bounds() {
        let engine = KvEngine::new();
        let key = key("mylist");
        let values: Vec<String> = (0..10).map(|i| format!("v{}", i)).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        engine.rpush(&key, &refs).unwrap();

        assert_eq!(engine.lrange(&key, 0, 2).unwrap(), vec!["v0", "v1", "v2"]);
        assert_eq!(engine.lrange(&key, -2, -1).unwrap(), vec!["v8", "v9"]);
        assert_eq!(engine.lrange(&key, 8, 100).unwrap(), vec!["v8", "v9"]);
        assert!(engine.lrange(&key, 5, 2).unwrap().is_empty());
        assert!(engine.lrange(&key, 20, 30).unwrap().is_empty());
        assert!(engine.lrange(&KvKey::new("missing").unwrap(), 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_set_operations() {
        let engine = KvEngine::new();
        let key = key("myset");

        assert_eq!(engine.sadd(&key, &["a", "b", "a"]).unwrap(), 2);
        assert_eq!(engine.sadd(&key, &["b", "c"]).unwrap(), 1);
        assert_eq!(engine.scard(&key).unwrap(), 3);

        assert!(engine.sismember(&key, "c").unwrap());
        assert!(!engine.sismember(&key, "z").unwrap());

        let members = engine.smembers(&key).unwrap();
        assert_eq!(members.len(), 3);
        assert!(members.contains("a"));
    }

    #[test]
    fn test_sorted_set_operations() {
        let engine = KvEngine::new();
        let key = key("myzset");

        assert_eq!(engine.zadd(&key, &[("c", 3.0), ("a", 1.0), ("b", 2.0)]).unwrap(), 3);
        assert_eq!(engine.zadd(&key, &[("a", 4.0)]).unwrap(), 0);

        assert_eq!(engine.zrange(&key, 0, -1).unwrap(), vec!["b", "c", "a"]);
        assert_eq!(engine.zrange(&key, 0, 0).unwrap(), vec!["b"]);
        assert_eq!(engine.zscore(&key, "a").unwrap(), Some(4.0));
        assert_eq!(engine.zscore(&key, "missing").unwrap(), None);
        assert_eq!(engine.zcard(&key).unwrap(), 3);
    }

    #[test]
    fn test_collection_type_mismatch() {
        let engine = KvEngine::new();
        let key = key("plain");
        engine.set(&key, KvValue::String("v".to_string()), None);

        assert!(matches!(engine.lpush(&key, &["x"]), Err(KvError::TypeMismatch { .. })));
        assert!(matches!(engine.sadd(&key, &["x"]), Err(KvError::TypeMismatch { .. })));
        assert!(matches!(engine.zadd(&key, &[("x", 1.0)]), Err(KvError::TypeMismatch { .. })));

        let set_key = KvKey::new("a_set").unwrap();
        engine.sadd(&set_key, &["m"]).unwrap();
        assert!(matches!(engine.get_string(&set_key), Err(KvError::TypeMismatch { .. })));
    }

    #[test]
    fn test_keys_glob() {
        let engine = KvEngine::with_shards(8);
        for i in 0..20 {
            engine.set(&KvKey::new(format!("key_{}", i)).unwrap(), KvValue::Int(i), None);
        }
        engine.set(&key("other"), KvValue::Int(0), None);

        assert_eq!(engine.keys("key_*").len(), 20);
        assert_eq!(engine.keys("key_?").len(), 10);
        assert_eq!(engine.keys("*").len(), 21);
        assert!(engine.keys("nothing*").is_empty());
    }

    #[test]
    fn test_flush_all() {
        let engine = KvEngine::new();
        engine.set(&key("a"), KvValue::Int(1), None);
        engine.sadd(&key("s"), &["m"]).unwrap();

        engine.flush_all();
        assert!(engine.is_empty());
        assert_eq!(engine.len(), 0);
    }

    #[test]
    fn test_batch_delete_and_exists() {
        let engine = KvEngine::new();
        let (a, b, c) = (key("a"), key("b"), key("c"));
        engine.set(&a, KvValue::Int(1), None);
        engine.set(&b, KvValue::Int(2), None);

        assert_eq!(engine.mexists(&[&a, &b, &c]), vec![true, true, false]);
        assert_eq!(engine.mdel(&[&a, &c]), 1);
        assert_eq!(engine.mexists(&[&a, &b]), vec![false, true]);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;

        let engine = Arc::new(KvEngine::new());
        let mut handles = vec![];

        // Spawn 10 threads, each incrementing 100 different keys
        for _t in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let key = KvKey::new(format!("key_{}", i)).unwrap();
                    engine.incr(&key, 1).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // Each of 100 keys should have been incremented 10 times
        for i in 0..100 {
            let key = KvKey::new(format!("key_{}", i)).unwrap();
            assert_eq!(engine.get(&key), Some(KvValue::Int(10)));
        }
    }

    #[test]
    fn test_sharding_distribution() {
        let engine = KvEngine::with_shards(16);

        for i in 0..1000 {
            let key = KvKey::new(format!("key_{}", i)).unwrap();
            engine.set(&key, KvValue::Int(i), None);
        }

        let non_empty_shards = engine.shards.iter().filter(|s| !s.is_empty()).count();

        // With 1000 keys and 16 shards, we expect most shards to have keys
        assert!(non_empty_shards >= 14, "Poor distribution: only {} shards have data", non_empty_shards);
    }

    #[test]
    fn test_cleanup_expired() {
        let engine = KvEngine::new();

        for i in 0..10 {
            let key = KvKey::new(format!("expire_{}", i)).unwrap();
            engine.set(&key, KvValue::Int(i), Some(Duration::from_millis(5)));
        }
        for i in 0..10 {
            let key = KvKey::new(format!("persist_{}", i)).unwrap();
            engine.set(&key, KvValue::Int(i), None);
        }

        assert_eq!(engine.len(), 20);

        thread::sleep(Duration::from_millis(10));

        assert_eq!(engine.cleanup_expired(), 10);
        assert_eq!(engine.len(), 10);
        assert_eq!(engine.keys("*").len(), 10);
    }
}
