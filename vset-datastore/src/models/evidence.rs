use serde::{Deserialize, Serialize};

use crate::keys::RecordKind;
use crate::Model;

/// Misbehaviour evidence embedded in a block, kept verbatim.
///
/// Only stored when the block's evidence list is non-empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Evidence(pub Vec<serde_json::Value>);

impl Model for Evidence {
    const KIND: RecordKind = RecordKind::Evidence;
}

impl Evidence {
    pub fn from_list(list: Vec<serde_json::Value>) -> Option<Self> {
        if list.is_empty() {
            None
        } else {
            Some(Self(list))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
