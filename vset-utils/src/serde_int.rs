//! Tolerant integer decoding for RPC payloads.
//!
//! CometBFT encodes 64-bit integers as JSON strings, while some forks and
//! proxies emit plain numbers. Both forms are accepted here.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl StringOrNumber {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            StringOrNumber::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| E::custom(format!("invalid integer {:?}: {}", s, e))),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}

pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer)?.into_u64()
}

/// Like [`deserialize_u64`] but maps `null` to `None`.
pub fn deserialize_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(value) => value.into_u64().map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Header {
        #[serde(deserialize_with = "deserialize_u64")]
        height: u64,
        #[serde(default, deserialize_with = "deserialize_opt_u64")]
        total: Option<u64>,
    }

    #[test]
    fn test_string_height() {
        let header: Header = serde_json::from_str(r#"{"height": "12345"}"#).unwrap();
        assert_eq!(header.height, 12345);
        assert_eq!(header.total, None);
    }

    #[test]
    fn test_number_height() {
        let header: Header = serde_json::from_str(r#"{"height": 7, "total": "3"}"#).unwrap();
        assert_eq!(header.height, 7);
        assert_eq!(header.total, Some(3));
    }

    #[test]
    fn test_null_total() {
        let header: Header = serde_json::from_str(r#"{"height": "1", "total": null}"#).unwrap();
        assert_eq!(header.total, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Header>(r#"{"height": "12a"}"#).is_err());
        assert!(serde_json::from_str::<Header>(r#"{"height": -1}"#).is_err());
    }
}
