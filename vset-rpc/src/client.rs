use async_trait::async_trait;
use vset_datastore::models::{Block, Evidence, Validator};

use crate::Result;

/// A block as returned by the chain, with its evidence split out.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBlock {
    pub block: Block,
    pub evidence: Option<Evidence>,
}

/// Query-by-height access to one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn name(&self) -> &str;
    async fn latest_height(&self) -> Result<u64>;
    async fn block_at(&self, height: u64) -> Result<FetchedBlock>;
    async fn validators_at(&self, height: u64) -> Result<Vec<Validator>>;
}
