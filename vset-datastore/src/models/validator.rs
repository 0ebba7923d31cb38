use serde::{Deserialize, Serialize};
use vset_utils::content_hash::content_hash;

use crate::keys::RecordKind;
use crate::Model;

/// A validator as cached: public key material is never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Validator {
    pub address: String,
    pub voting_power: u64,
}

impl Validator {
    pub fn new(address: impl Into<String>, voting_power: u64) -> Self {
        Self {
            address: address.into(),
            voting_power,
        }
    }
}

/// The validators active at one height, in whatever order the chain reported.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ValidatorSet {
    pub validators: Vec<Validator>,
}

impl Model for ValidatorSet {
    const KIND: RecordKind = RecordKind::Validators;
}

impl From<Vec<Validator>> for ValidatorSet {
    fn from(validators: Vec<Validator>) -> Self {
        Self { validators }
    }
}

impl ValidatorSet {
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Order-independent digest of membership and voting power.
    pub fn content_hash(&self) -> String {
        content_hash(
            self.validators
                .iter()
                .map(|v| (v.address.as_str(), v.voting_power)),
        )
    }

    pub fn total_voting_power(&self) -> u64 {
        self.validators.iter().map(|v| v.voting_power).sum()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
