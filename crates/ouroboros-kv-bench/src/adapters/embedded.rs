//! In-process target backed by the ouroboros KV engine

use crate::target::{KvTarget, TargetResult};
use ouroboros_kv::{KvEngine, KvKey, KvValue};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Subject target: calls straight into a shared [`KvEngine`]
pub struct EmbeddedTarget {
    engine: Arc<KvEngine>,
}

impl EmbeddedTarget {
    pub fn new(engine: Arc<KvEngine>) -> Self {
        Self { engine }
    }

    /// Engine with the given shard count
    pub fn with_shards(num_shards: usize) -> Self {
        Self::new(Arc::new(KvEngine::with_shards(num_shards)))
    }

    pub fn engine(&self) -> &Arc<KvEngine> {
        &self.engine
    }
}

impl Default for EmbeddedTarget {
    fn default() -> Self {
        Self::new(Arc::new(KvEngine::new()))
    }
}

fn parse_key(name: &str) -> TargetResult<KvKey> {
    Ok(KvKey::new(name)?)
}

fn parse_keys(names: &[&str]) -> TargetResult<Vec<KvKey>> {
    names.iter().map(|name| parse_key(name)).collect()
}

impl KvTarget for EmbeddedTarget {
    fn name(&self) -> &str {
        "ouroboros-kv"
    }

    fn ping(&mut self) -> TargetResult<()> {
        Ok(())
    }

    fn set(&mut self, k: &str, value: &str) -> TargetResult<()> {
        self.engine.set(&parse_key(k)?, KvValue::String(value.to_string()), None);
        Ok(())
    }

    fn get(&mut self, k: &str) -> TargetResult<Option<String>> {
        Ok(self.engine.get_string(&parse_key(k)?)?)
    }

    fn delete(&mut self, names: &[&str]) -> TargetResult<u64> {
        let owned = parse_keys(names)?;
        let refs: Vec<&KvKey> = owned.iter().collect();
        Ok(self.engine.mdel(&refs) as u64)
    }

    fn incr(&mut self, k: &str) -> TargetResult<i64> {
        Ok(self.engine.incr(&parse_key(k)?, 1)?)
    }

    fn lpush(&mut self, k: &str, values: &[&str]) -> TargetResult<u64> {
        Ok(self.engine.lpush(&parse_key(k)?, values)? as u64)
    }

    fn rpush(&mut self, k: &str, values: &[&str]) -> TargetResult<u64> {
        Ok(self.engine.rpush(&parse_key(k)?, values)? as u64)
    }

    fn lpop(&mut self, k: &str) -> TargetResult<Option<String>> {
        Ok(self.engine.lpop(&parse_key(k)?)?)
    }

    fn lrange(&mut self, k: &str, start: i64, stop: i64) -> TargetResult<Vec<String>> {
        Ok(self.engine.lrange(&parse_key(k)?, start, stop)?)
    }

    fn sadd(&mut self, k: &str, members: &[&str]) -> TargetResult<u64> {
        Ok(self.engine.sadd(&parse_key(k)?, members)? as u64)
    }

    fn smembers(&mut self, k: &str) -> TargetResult<HashSet<String>> {
        Ok(self.engine.smembers(&parse_key(k)?)?)
    }

    fn sismember(&mut self, k: &str, member: &str) -> TargetResult<bool> {
        Ok(self.engine.sismember(&parse_key(k)?, member)?)
    }

    fn zadd(&mut self, k: &str, members: &[(&str, f64)]) -> TargetResult<u64> {
        Ok(self.engine.zadd(&parse_key(k)?, members)? as u64)
    }

    fn zrange(&mut self, k: &str, start: i64, stop: i64) -> TargetResult<Vec<String>> {
        Ok(self.engine.zrange(&parse_key(k)?, start, stop)?)
    }

    fn zscore(&mut self, k: &str, member: &str) -> TargetResult<Option<f64>> {
        Ok(self.engine.zscore(&parse_key(k)?, member)?)
    }

    fn expire(&mut self, k: &str, seconds: u64) -> TargetResult<bool> {
        Ok(self.engine.expire(&parse_key(k)?, Duration::from_secs(seconds)))
    }

    fn exists(&mut self, names: &[&str]) -> TargetResult<u64> {
        let owned = parse_keys(names)?;
        let refs: Vec<&KvKey> = owned.iter().collect();
        Ok(self.engine.mexists(&refs).into_iter().filter(|e| *e).count() as u64)
    }

    fn keys(&mut self, pattern: &str) -> TargetResult<Vec<String>> {
        Ok(self.engine.keys(pattern))
    }

    fn flushall(&mut self) -> TargetResult<()> {
        self.engine.flush_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetError;

    #[test]
    fn test_string_commands() {
        let mut target = EmbeddedTarget::default();

        target.set("key_1", "value_1").unwrap();
        assert_eq!(target.get("key_1").unwrap(), Some("value_1".to_string()));
        assert_eq!(target.get("key_2").unwrap(), None);

        assert_eq!(target.exists(&["key_1", "key_2"]).unwrap(), 1);
        assert_eq!(target.delete(&["key_1", "key_2"]).unwrap(), 1);
        assert_eq!(target.exists(&["key_1"]).unwrap(), 0);
    }

    #[test]
    fn test_incr_then_get() {
        let mut target = EmbeddedTarget::default();

        for _ in 0..3 {
            target.incr("counter").unwrap();
        }
        assert_eq!(target.get("counter").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn test_collections() {
        let mut target = EmbeddedTarget::default();

        target.rpush("mylist", &["a", "b"]).unwrap();
        target.lpush("mylist", &["z"]).unwrap();
        assert_eq!(target.lrange("mylist", 0, -1).unwrap(), vec!["z", "a", "b"]);
        assert_eq!(target.lpop("mylist").unwrap(), Some("z".to_string()));

        assert_eq!(target.sadd("myset", &["m1", "m2"]).unwrap(), 2);
        assert!(target.sismember("myset", "m1").unwrap());
        assert_eq!(target.smembers("myset").unwrap().len(), 2);

        assert_eq!(target.zadd("myzset", &[("m1", 2.0), ("m0", 1.0)]).unwrap(), 2);
        assert_eq!(target.zrange("myzset", 0, -1).unwrap(), vec!["m0", "m1"]);
        assert_eq!(target.zscore("myzset", "m1").unwrap(), Some(2.0));
    }

    #[test]
    fn test_expire_keys_and_flush() {
        let mut target = EmbeddedTarget::with_shards(4);

        target.set("key_1", "v").unwrap();
        target.set("key_2", "v").unwrap();
        assert!(target.expire("key_1", 300).unwrap());
        assert!(!target.expire("missing", 300).unwrap());

        let mut found = target.keys("key_*").unwrap();
        found.sort();
        assert_eq!(found, vec!["key_1", "key_2"]);

        target.flushall().unwrap();
        assert!(target.engine().is_empty());
    }

    #[test]
    fn test_invalid_key_is_store_error() {
        let mut target = EmbeddedTarget::default();

        let result = target.set("", "v");
        assert!(matches!(result, Err(TargetError::Store(_))));
    }
}
