//! Benchmark scenario catalog
//!
//! A fixed, ordered list of named programs. Each program receives the
//! target and the scenario's op count and runs to completion. Some
//! programs populate data before the operation under test; that work is
//! part of the measured interval.

use crate::target::{KvTarget, TargetError};

/// One timed command sequence
pub type Program = fn(&mut dyn KvTarget, u64) -> Result<(), TargetError>;

const LIST_KEY: &str = "mylist";
const SET_KEY: &str = "myset";
const ZSET_KEY: &str = "myzset";
const COUNTER_KEY: &str = "counter";

/// Size of the collection populated by read-side collection scenarios
const COLLECTION_SIZE: u64 = 1_000;

/// One named, fixed-size benchmark unit
#[derive(Clone, Copy)]
pub struct BenchmarkScenario {
    pub name: &'static str,
    pub op_count: u64,
    pub subject_program: Program,
    /// `None` runs the scenario subject-only
    pub reference_program: Option<Program>,
}

impl BenchmarkScenario {
    /// Scenario whose subject and reference legs run the same program
    pub const fn symmetric(name: &'static str, op_count: u64, program: Program) -> Self {
        Self {
            name,
            op_count,
            subject_program: program,
            reference_program: Some(program),
        }
    }
}

impl std::fmt::Debug for BenchmarkScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkScenario")
            .field("name", &self.name)
            .field("op_count", &self.op_count)
            .field("has_reference", &self.reference_program.is_some())
            .finish()
    }
}

static CATALOG: [BenchmarkScenario; 17] = [
    BenchmarkScenario::symmetric("SET", 10_000, run_set),
    BenchmarkScenario::symmetric("GET", 10_000, run_get),
    BenchmarkScenario::symmetric("DELETE", 5_000, run_delete),
    BenchmarkScenario::symmetric("INCR", 10_000, run_incr),
    BenchmarkScenario::symmetric("LPUSH", 10_000, run_lpush),
    BenchmarkScenario::symmetric("RPUSH", 10_000, run_rpush),
    BenchmarkScenario::symmetric("LPOP", 5_000, run_lpop),
    BenchmarkScenario::symmetric("LRANGE", 1_000, run_lrange),
    BenchmarkScenario::symmetric("SADD", 10_000, run_sadd),
    BenchmarkScenario::symmetric("SMEMBERS", 1_000, run_smembers),
    BenchmarkScenario::symmetric("SISMEMBER", 10_000, run_sismember),
    BenchmarkScenario::symmetric("ZADD", 10_000, run_zadd),
    BenchmarkScenario::symmetric("ZRANGE", 1_000, run_zrange),
    BenchmarkScenario::symmetric("ZSCORE", 10_000, run_zscore),
    BenchmarkScenario::symmetric("EXPIRE", 5_000, run_expire),
    BenchmarkScenario::symmetric("EXISTS", 10_000, run_exists),
    BenchmarkScenario::symmetric("KEYS", 100, run_keys),
];

/// The full scenario catalog in execution order
pub fn catalog() -> &'static [BenchmarkScenario] {
    &CATALOG
}

fn key(i: u64) -> String {
    format!("key_{}", i)
}

fn value(i: u64) -> String {
    format!("value_{}", i)
}

fn member(i: u64) -> String {
    format!("member_{}", i)
}

fn populate_keys(target: &mut dyn KvTarget, count: u64) -> Result<(), TargetError> {
    for i in 0..count {
        target.set(&key(i), &value(i))?;
    }
    Ok(())
}

fn populate_list(target: &mut dyn KvTarget, count: u64) -> Result<(), TargetError> {
    for i in 0..count {
        target.rpush(LIST_KEY, &[value(i).as_str()])?;
    }
    Ok(())
}

fn populate_set(target: &mut dyn KvTarget, count: u64) -> Result<(), TargetError> {
    for i in 0..count {
        target.sadd(SET_KEY, &[member(i).as_str()])?;
    }
    Ok(())
}

fn populate_zset(target: &mut dyn KvTarget, count: u64) -> Result<(), TargetError> {
    for i in 0..count {
        target.zadd(ZSET_KEY, &[(member(i).as_str(), i as f64)])?;
    }
    Ok(())
}

fn run_set(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_keys(target, ops)
}

fn run_get(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_keys(target, ops)?;
    for i in 0..ops {
        target.get(&key(i))?;
    }
    Ok(())
}

fn run_delete(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_keys(target, ops)?;
    for i in 0..ops {
        target.delete(&[key(i).as_str()])?;
    }
    Ok(())
}

fn run_incr(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    for _ in 0..ops {
        target.incr(COUNTER_KEY)?;
    }
    Ok(())
}

fn run_lpush(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    for i in 0..ops {
        target.lpush(LIST_KEY, &[value(i).as_str()])?;
    }
    Ok(())
}

fn run_rpush(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_list(target, ops)
}

fn run_lpop(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_list(target, ops)?;
    for _ in 0..ops {
        target.lpop(LIST_KEY)?;
    }
    Ok(())
}

fn run_lrange(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_list(target, COLLECTION_SIZE)?;
    for _ in 0..ops {
        target.lrange(LIST_KEY, 0, 99)?;
    }
    Ok(())
}

fn run_sadd(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_set(target, ops)
}

fn run_smembers(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_set(target, COLLECTION_SIZE)?;
    for _ in 0..ops {
        target.smembers(SET_KEY)?;
    }
    Ok(())
}

fn run_sismember(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_set(target, COLLECTION_SIZE)?;
    for i in 0..ops {
        target.sismember(SET_KEY, &member(i % COLLECTION_SIZE))?;
    }
    Ok(())
}

fn run_zadd(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_zset(target, ops)
}

fn run_zrange(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_zset(target, COLLECTION_SIZE)?;
    for _ in 0..ops {
        target.zrange(ZSET_KEY, 0, 99)?;
    }
    Ok(())
}

fn run_zscore(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_zset(target, COLLECTION_SIZE)?;
    for i in 0..ops {
        target.zscore(ZSET_KEY, &member(i % COLLECTION_SIZE))?;
    }
    Ok(())
}

fn run_expire(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_keys(target, ops)?;
    for i in 0..ops {
        target.expire(&key(i), 300)?;
    }
    Ok(())
}

fn run_exists(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    // Half the probed keys exist
    populate_keys(target, ops / 2)?;
    for i in 0..ops {
        target.exists(&[key(i).as_str()])?;
    }
    Ok(())
}

fn run_keys(target: &mut dyn KvTarget, ops: u64) -> Result<(), TargetError> {
    populate_keys(target, COLLECTION_SIZE)?;
    for _ in 0..ops {
        target.keys("key_*")?;
    }
    Ok(())
}
