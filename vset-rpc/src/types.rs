//! Wire types for the CometBFT JSON-RPC endpoints the client queries.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! payload is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vset_datastore::models::{Block, Commit, CommitSig, Evidence, Validator};
use vset_utils::serde_int::{deserialize_opt_u64, deserialize_u64};

use crate::{FetchedBlock, RpcError};

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl<T> JsonRpcResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T, RpcError> {
        if let Some(error) = self.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data.map(|data| match data {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
            });
        }
        self.result
            .ok_or_else(|| RpcError::EmptyResult(method.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusResult {
    pub sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
pub struct SyncInfo {
    #[serde(deserialize_with = "deserialize_u64")]
    pub latest_block_height: u64,
}

#[derive(Debug, Deserialize)]
pub struct BlockResult {
    pub block: RpcBlock,
}

#[derive(Debug, Deserialize)]
pub struct RpcBlock {
    pub header: RpcHeader,
    #[serde(default)]
    pub evidence: Option<RpcEvidenceData>,
    #[serde(default)]
    pub last_commit: Option<RpcCommit>,
}

#[derive(Debug, Deserialize)]
pub struct RpcHeader {
    #[serde(deserialize_with = "deserialize_u64")]
    pub height: u64,
    pub time: DateTime<Utc>,
    pub validators_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct RpcEvidenceData {
    #[serde(default)]
    pub evidence: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct RpcCommit {
    #[serde(deserialize_with = "deserialize_u64")]
    pub height: u64,
    #[serde(default)]
    pub signatures: Option<Vec<RpcCommitSig>>,
}

#[derive(Debug, Deserialize)]
pub struct RpcCommitSig {
    #[serde(default)]
    pub validator_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorsResult {
    #[serde(deserialize_with = "deserialize_u64")]
    pub block_height: u64,
    #[serde(default)]
    pub validators: Vec<RpcValidator>,
    #[serde(default, deserialize_with = "deserialize_opt_u64")]
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RpcValidator {
    pub address: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub voting_power: u64,
}

impl From<RpcValidator> for Validator {
    fn from(v: RpcValidator) -> Self {
        Validator::new(v.address, v.voting_power)
    }
}

impl From<RpcCommit> for Commit {
    fn from(commit: RpcCommit) -> Self {
        Commit {
            height: commit.height,
            signatures: commit
                .signatures
                .unwrap_or_default()
                .into_iter()
                .map(|sig| CommitSig {
                    validator_address: sig.validator_address.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl From<RpcBlock> for FetchedBlock {
    fn from(rpc: RpcBlock) -> Self {
        let evidence = rpc
            .evidence
            .and_then(|data| data.evidence)
            .and_then(Evidence::from_list);
        let block = Block {
            height: rpc.header.height,
            time: rpc.header.time,
            validators_hash: rpc.header.validators_hash,
            last_commit: rpc.last_commit.map(Commit::from),
        };
        FetchedBlock { block, evidence }
    }
}
