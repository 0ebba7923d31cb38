#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use vset_analysis::{ChainConfig, ValidatorSetChangeEvent};
use vset_datastore::models::{Validator, ValidatorSet};
use vset_datastore::BlockDatastore;
use vset_devnet::MockChain;

pub const BLOCK_TIME_SECS: i64 = 6;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn time_at(height: u64) -> DateTime<Utc> {
    t0() + Duration::seconds(BLOCK_TIME_SECS * height as i64)
}

/// The `k`-th distinct validator set used by the tests.
pub fn numbered_set(k: u64) -> ValidatorSet {
    ValidatorSet::new(vec![
        Validator::new("AAAA", 100),
        Validator::new("BBBB", 100 + k),
        Validator::new("CCCC", 50),
    ])
}

/// A chain covering `first..=last` whose set number at each height is
/// `set_for(height)`.
pub fn scheduled_chain(
    name: &str,
    first: u64,
    last: u64,
    set_for: impl Fn(u64) -> u64,
) -> MockChain {
    let mut chain = MockChain::new(name);
    for height in first..=last {
        chain.push_block(height, time_at(height), &numbered_set(set_for(height)));
    }
    chain
}

pub fn config(name: &str, min_height: u64) -> ChainConfig {
    ChainConfig::new(name, "http://127.0.0.1:26657", min_height).unwrap()
}

pub fn memory_datastore() -> Arc<BlockDatastore> {
    Arc::new(BlockDatastore::create_in_memory().unwrap())
}

/// Every cached entry of `chain`, for before/after comparisons.
pub fn snapshot(datastore: &BlockDatastore, chain: &str) -> Vec<(Vec<u8>, Vec<u8>)> {
    datastore
        .iterator(&format!("{}:", chain))
        .map(|r| {
            let (k, v) = r.unwrap();
            (k.to_vec(), v.to_vec())
        })
        .collect()
}

/// Hand-built event at `t0 + secs` seconds.
pub fn event(height: u64, secs: i64, content: &str, previous: &str) -> ValidatorSetChangeEvent {
    ValidatorSetChangeEvent {
        height,
        timestamp: t0() + Duration::seconds(secs),
        validators_hash: format!("NATIVE-{}", content),
        previous_validators_hash: if previous.is_empty() {
            String::new()
        } else {
            format!("NATIVE-{}", previous)
        },
        content_hash: content.to_string(),
        previous_content_hash: previous.to_string(),
    }
}
