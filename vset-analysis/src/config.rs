use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const PROVIDER_CHAIN: &str = "provider";

/// Identity and RPC settings of one chain, built once and handed to every
/// component that touches that chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Namespace for cache keys and the changelog file name.
    pub name: String,
    pub rpc_addr: String,
    /// First height that is ingested and scanned.
    pub min_height: u64,
}

impl ChainConfig {
    pub fn new(name: &str, rpc_addr: &str, min_height: u64) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::Config("chain name must not be empty".to_string()));
        }
        if name.contains(':') {
            return Err(Error::Config(format!("chain name {:?} must not contain ':'", name)));
        }
        if rpc_addr.is_empty() {
            return Err(Error::Config(format!("missing RPC address for chain {}", name)));
        }
        Ok(Self {
            name: name.to_string(),
            rpc_addr: rpc_addr.to_string(),
            min_height,
        })
    }

    pub fn is_provider(&self) -> bool {
        self.name == PROVIDER_CHAIN
    }

    /// Upper-case environment prefix for this chain, e.g. `NEUTRON` for
    /// `neutron` or `STRIDE_1` for `stride-1`.
    pub fn env_prefix(name: &str) -> String {
        name.to_uppercase().replace('-', "_")
    }

    /// Fails when the chain has not yet reached the configured minimum height.
    pub fn check_reachable(&self, latest_height: u64) -> Result<()> {
        if latest_height < self.min_height {
            return Err(Error::Config(format!(
                "latest block {} on {} is less than minimum height {}",
                latest_height, self.name, self.min_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(ChainConfig::new("provider", "http://localhost:26657", 1).is_ok());
        assert!(matches!(ChainConfig::new("", "http://x", 1), Err(Error::Config(_))));
        assert!(matches!(ChainConfig::new("neutron", "", 1), Err(Error::Config(_))));
        assert!(matches!(ChainConfig::new("a:b", "http://x", 1), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ChainConfig::env_prefix("neutron"), "NEUTRON");
        assert_eq!(ChainConfig::env_prefix("stride-1"), "STRIDE_1");
    }

    #[test]
    fn test_check_reachable() {
        let config = ChainConfig::new("provider", "http://x", 100).unwrap();
        assert!(config.check_reachable(100).is_ok());
        assert!(config.check_reachable(500).is_ok());
        assert!(matches!(config.check_reachable(99), Err(Error::Config(_))));
        assert!(config.is_provider());
    }
}
