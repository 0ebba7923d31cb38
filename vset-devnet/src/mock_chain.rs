use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use vset_datastore::models::{Block, Commit, CommitSig, Evidence, Validator, ValidatorSet};
use vset_rpc::{ChainClient, FetchedBlock, Result, RpcError};

/// A chain described as a schedule of validator sets.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSpec {
    pub name: String,
    pub first_height: u64,
    pub last_height: u64,
    pub genesis_time: DateTime<Utc>,
    pub block_time_secs: i64,
    pub validator_sets: Vec<ScheduledSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledSet {
    pub from_height: u64,
    pub validators: Vec<Validator>,
}

impl ChainSpec {
    pub fn time_at(&self, height: u64) -> DateTime<Utc> {
        self.genesis_time + Duration::seconds(self.block_time_secs * height as i64)
    }

    /// The set scheduled to be active at `height`, if any.
    pub fn set_at(&self, height: u64) -> Option<ValidatorSet> {
        self.validator_sets
            .iter()
            .filter(|s| s.from_height <= height)
            .max_by_key(|s| s.from_height)
            .map(|s| ValidatorSet::new(s.validators.clone()))
    }
}

/// Chain-specific digest standing in for a real validators hash.
///
/// Salted with the chain name, so never comparable across chains.
pub fn native_validators_hash(chain: &str, set: &ValidatorSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chain.as_bytes());
    for v in &set.validators {
        hasher.update(format!("|{}:{}", v.address, v.voting_power).as_bytes());
    }
    hex::encode_upper(hasher.finalize())
}

/// In-memory [`ChainClient`] that counts the calls made against it.
#[derive(Debug, Default)]
pub struct MockChain {
    name: String,
    latest_height: u64,
    blocks: BTreeMap<u64, Block>,
    evidence: HashMap<u64, Evidence>,
    validators: BTreeMap<u64, ValidatorSet>,
    failing_blocks: HashSet<u64>,
    failing_validators: HashSet<u64>,
    latest_height_calls: AtomicUsize,
    block_calls: AtomicUsize,
    validator_calls: AtomicUsize,
}

impl MockChain {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_spec(spec: &ChainSpec) -> Self {
        let mut chain = Self::new(&spec.name);
        for height in spec.first_height..=spec.last_height {
            if let Some(set) = spec.set_at(height) {
                chain.push_block(height, spec.time_at(height), &set);
            }
        }
        chain
    }

    /// Appends a block whose active validator set is `set`; every member signs
    /// the last commit.
    pub fn push_block(&mut self, height: u64, time: DateTime<Utc>, set: &ValidatorSet) {
        let last_commit = (height > 0).then(|| Commit {
            height: height - 1,
            signatures: set
                .validators
                .iter()
                .map(|v| CommitSig {
                    validator_address: v.address.clone(),
                })
                .collect(),
        });
        let block = Block {
            height,
            time,
            validators_hash: native_validators_hash(&self.name, set),
            last_commit,
        };
        self.blocks.insert(height, block);
        self.validators.insert(height, set.clone());
        self.latest_height = self.latest_height.max(height);
    }

    pub fn add_evidence(&mut self, height: u64, evidence: serde_json::Value) {
        self.evidence
            .entry(height)
            .or_insert_with(|| Evidence(Vec::new()))
            .0
            .push(evidence);
    }

    pub fn fail_block_at(&mut self, height: u64) {
        self.failing_blocks.insert(height);
    }

    pub fn heal_block_at(&mut self, height: u64) {
        self.failing_blocks.remove(&height);
    }

    pub fn fail_validators_at(&mut self, height: u64) {
        self.failing_validators.insert(height);
    }

    pub fn latest_height_calls(&self) -> usize {
        self.latest_height_calls.load(Ordering::SeqCst)
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn validator_calls(&self) -> usize {
        self.validator_calls.load(Ordering::SeqCst)
    }

    fn injected_failure(&self, what: &str, height: u64) -> RpcError {
        RpcError::Rpc {
            code: -32603,
            message: "Internal error".to_string(),
            data: Some(format!("injected {} failure at height {} on {}", what, height, self.name)),
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn latest_height(&self) -> Result<u64> {
        self.latest_height_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.latest_height)
    }

    async fn block_at(&self, height: u64) -> Result<FetchedBlock> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_blocks.contains(&height) {
            return Err(self.injected_failure("block", height));
        }
        let block = self
            .blocks
            .get(&height)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("block {} on {}", height, self.name)))?;
        Ok(FetchedBlock {
            block,
            evidence: self.evidence.get(&height).cloned(),
        })
    }

    async fn validators_at(&self, height: u64) -> Result<Vec<Validator>> {
        self.validator_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_validators.contains(&height) {
            return Err(self.injected_failure("validators", height));
        }
        self.validators
            .get(&height)
            .map(|set| set.validators.clone())
            .ok_or_else(|| RpcError::NotFound(format!("validators {} on {}", height, self.name)))
    }
}
