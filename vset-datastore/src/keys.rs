//! Cache key layout: `{chain}:{kind}:{height}`.
//!
//! Keys are namespaced by chain so provider and consumer records never
//! collide in the shared store.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

pub const KEY_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Block,
    Evidence,
    Validators,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Block => "block",
            RecordKind::Evidence => "evidence",
            RecordKind::Validators => "validators",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "block" => Ok(RecordKind::Block),
            "evidence" => Ok(RecordKind::Evidence),
            "validators" => Ok(RecordKind::Validators),
            other => Err(Error::InvalidKey(format!("unknown record kind {}", other))),
        }
    }
}

pub fn record_key(chain: &str, kind: RecordKind, height: u64) -> String {
    format!("{}{sep}{}{sep}{}", chain, kind, height, sep = KEY_SEPARATOR)
}

pub fn block_key(chain: &str, height: u64) -> String {
    record_key(chain, RecordKind::Block, height)
}

pub fn evidence_key(chain: &str, height: u64) -> String {
    record_key(chain, RecordKind::Evidence, height)
}

pub fn validators_key(chain: &str, height: u64) -> String {
    record_key(chain, RecordKind::Validators, height)
}

/// Prefix shared by every record of `kind` on `chain`, separator included.
pub fn record_prefix(chain: &str, kind: RecordKind) -> String {
    format!("{}{sep}{}{sep}", chain, kind, sep = KEY_SEPARATOR)
}

/// Splits a key into `(chain, kind, height)`.
///
/// The chain name is everything before the last two separators, so names
/// that themselves contain `:` still round-trip.
pub fn parse_record_key(key: &str) -> Result<(String, RecordKind, u64)> {
    let mut parts = key.rsplitn(3, KEY_SEPARATOR);
    let (height, kind, chain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(height), Some(kind), Some(chain)) if !chain.is_empty() => (height, kind, chain),
        _ => return Err(Error::InvalidKey(key.to_string())),
    };
    let height = height
        .parse::<u64>()
        .map_err(|_| Error::InvalidKey(key.to_string()))?;
    Ok((chain.to_string(), kind.parse()?, height))
}

/// Smallest byte string greater than every key starting with `prefix`.
pub(crate) fn prefix_upper_bound(prefix: &str) -> Vec<u8> {
    let mut bound = prefix.as_bytes().to_vec();
    while let Some(last) = bound.pop() {
        if last < u8::MAX {
            bound.push(last + 1);
            return bound;
        }
    }
    bound
}
