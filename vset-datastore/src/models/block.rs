use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::RecordKind;
use crate::Model;

/// The subset of a block header and last commit that the pipeline reads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub time: DateTime<Utc>,
    /// Chain-native digest of the active validator set.
    pub validators_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<Commit>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Commit {
    pub height: u64,
    #[serde(default)]
    pub signatures: Vec<CommitSig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitSig {
    /// Empty when the validator did not sign.
    #[serde(default)]
    pub validator_address: String,
}

impl Model for Block {
    const KIND: RecordKind = RecordKind::Block;
}

impl Block {
    /// Sorted addresses of the validators that signed the previous block, or
    /// `None` when the block carries no last commit.
    pub fn signer_addresses(&self) -> Option<Vec<String>> {
        let commit = self.last_commit.as_ref()?;
        let mut addresses: Vec<String> = commit
            .signatures
            .iter()
            .filter(|sig| !sig.validator_address.is_empty())
            .map(|sig| sig.validator_address.clone())
            .collect();
        addresses.sort();
        Some(addresses)
    }
}
