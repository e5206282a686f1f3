//! Reference target over the Redis protocol
//!
//! Uses a single synchronous connection. Every command is one unpipelined
//! round trip, so measurements include per-call network latency.

use super::ReferenceConnector;
use crate::endpoint::Endpoint;
use crate::target::{KvTarget, TargetResult};
use redis::{Commands, IntoConnectionInfo};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Default connect timeout for the reference server
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Target backed by a Redis-compatible server
pub struct RedisTarget {
    conn: redis::Connection,
}

impl RedisTarget {
    /// Open a connection to `endpoint`, authenticating when a password is given
    pub fn connect(
        endpoint: &Endpoint,
        password: Option<&str>,
        timeout: Duration,
    ) -> TargetResult<Self> {
        let mut info = (endpoint.host(), endpoint.port()).into_connection_info()?;
        info.redis.password = password.map(str::to_string);

        debug!(
            "Connecting to reference at {} (timeout={:?}, auth={})",
            endpoint,
            timeout,
            password.is_some()
        );

        let client = redis::Client::open(info)?;
        let conn = client.get_connection_with_timeout(timeout)?;
        Ok(Self { conn })
    }
}

impl KvTarget for RedisTarget {
    fn name(&self) -> &str {
        "redis"
    }

    fn ping(&mut self) -> TargetResult<()> {
        let _: String = redis::cmd("PING").query(&mut self.conn)?;
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> TargetResult<()> {
        let _: () = self.conn.set(key, value)?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> TargetResult<Option<String>> {
        Ok(self.conn.get(key)?)
    }

    fn delete(&mut self, keys: &[&str]) -> TargetResult<u64> {
        Ok(self.conn.del(keys)?)
    }

    fn incr(&mut self, key: &str) -> TargetResult<i64> {
        Ok(self.conn.incr(key, 1)?)
    }

    fn lpush(&mut self, key: &str, values: &[&str]) -> TargetResult<u64> {
        Ok(self.conn.lpush(key, values)?)
    }

    fn rpush(&mut self, key: &str, values: &[&str]) -> TargetResult<u64> {
        Ok(self.conn.rpush(key, values)?)
    }

    fn lpop(&mut self, key: &str) -> TargetResult<Option<String>> {
        Ok(self.conn.lpop(key, None)?)
    }

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> TargetResult<Vec<String>> {
        Ok(self.conn.lrange(key, start as isize, stop as isize)?)
    }

    fn sadd(&mut self, key: &str, members: &[&str]) -> TargetResult<u64> {
        Ok(self.conn.sadd(key, members)?)
    }

    fn smembers(&mut self, key: &str) -> TargetResult<HashSet<String>> {
        Ok(self.conn.smembers(key)?)
    }

    fn sismember(&mut self, key: &str, member: &str) -> TargetResult<bool> {
        Ok(self.conn.sismember(key, member)?)
    }

    fn zadd(&mut self, key: &str, members: &[(&str, f64)]) -> TargetResult<u64> {
        // ZADD takes score before member
        let items: Vec<(f64, &str)> = members.iter().map(|(m, s)| (*s, *m)).collect();
        Ok(self.conn.zadd_multiple(key, &items)?)
    }

    fn zrange(&mut self, key: &str, start: i64, stop: i64) -> TargetResult<Vec<String>> {
        Ok(self.conn.zrange(key, start as isize, stop as isize)?)
    }

    fn zscore(&mut self, key: &str, member: &str) -> TargetResult<Option<f64>> {
        Ok(self.conn.zscore(key, member)?)
    }

    fn expire(&mut self, key: &str, seconds: u64) -> TargetResult<bool> {
        Ok(self.conn.expire(key, seconds as i64)?)
    }

    fn exists(&mut self, keys: &[&str]) -> TargetResult<u64> {
        Ok(self.conn.exists(keys)?)
    }

    fn keys(&mut self, pattern: &str) -> TargetResult<Vec<String>> {
        Ok(self.conn.keys(pattern)?)
    }

    fn flushall(&mut self) -> TargetResult<()> {
        let _: () = redis::cmd("FLUSHALL").query(&mut self.conn)?;
        Ok(())
    }
}

/// Opens [`RedisTarget`] connections for the comparison session
#[derive(Debug, Clone)]
pub struct RedisConnector {
    timeout: Duration,
}

impl RedisConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RedisConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl ReferenceConnector for RedisConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        password: Option<&str>,
    ) -> TargetResult<Box<dyn KvTarget>> {
        Ok(Box::new(RedisTarget::connect(endpoint, password, self.timeout)?))
    }
}
