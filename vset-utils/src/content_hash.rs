use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Separator placed between rendered `address:power` members.
pub const MEMBER_SEPARATOR: &str = ";";

/// Canonical digest of a validator set.
///
/// Each member is rendered as `address:power`, the rendered strings are sorted
/// and joined with [`MEMBER_SEPARATOR`], and the result is hashed with SHA-256.
/// Enumeration order of the input does not affect the output, which makes the
/// digest comparable across chains that report the same membership.
pub fn content_hash<I, A>(members: I) -> String
where
    I: IntoIterator<Item = (A, u64)>,
    A: Display,
{
    let mut rendered: Vec<String> = members
        .into_iter()
        .map(|(address, power)| format!("{}:{}", address, power))
        .collect();
    rendered.sort();
    let joined = rendered.join(MEMBER_SEPARATOR);
    hex::encode(Sha256::digest(joined.as_bytes()))
}
