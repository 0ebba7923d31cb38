use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use vset_datastore::models::Block;
use vset_datastore::{BlockDatastore, Model};
use vset_rpc::ChainClient;

use crate::{ChainConfig, Error, Result};

pub const DEFAULT_CONCURRENCY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed { evidence: bool },
    Skipped,
}

/// What one ingest run did to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub from_height: u64,
    pub to_height: u64,
    pub indexed: usize,
    pub skipped: usize,
    pub with_evidence: usize,
    /// Heights left unindexed, ascending.
    pub failed: Vec<u64>,
}

impl IngestReport {
    pub fn requested(&self) -> usize {
        if self.to_height < self.from_height {
            0
        } else {
            (self.to_height - self.from_height + 1) as usize
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, height: u64, outcome: Result<IndexOutcome>, chain: &str) {
        match outcome {
            Ok(IndexOutcome::Indexed { evidence }) => {
                self.indexed += 1;
                if evidence {
                    self.with_evidence += 1;
                }
            }
            Ok(IndexOutcome::Skipped) => self.skipped += 1,
            Err(e) => {
                log::error!("failed to index block {} on {}: {}", height, chain, e);
                self.failed.push(height);
            }
        }
    }

    fn record_joined(
        &mut self,
        heights: &mut HashMap<Id, u64>,
        joined: std::result::Result<(Id, (u64, Result<IndexOutcome>)), JoinError>,
        chain: &str,
    ) {
        match joined {
            Ok((id, (height, outcome))) => {
                heights.remove(&id);
                self.record(height, outcome, chain);
            }
            Err(e) => match heights.remove(&e.id()) {
                Some(height) => {
                    log::error!(
                        "ingest task for block {} on {} did not complete: {}",
                        height,
                        chain,
                        e
                    );
                    self.failed.push(height);
                }
                None => log::error!("ingest task on {} did not complete: {}", chain, e),
            },
        }
    }
}

/// Fetches blocks into the cache, one task per height.
pub struct Ingestor {
    config: ChainConfig,
    client: Arc<dyn ChainClient>,
    datastore: Arc<BlockDatastore>,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(
        config: ChainConfig,
        client: Arc<dyn ChainClient>,
        datastore: Arc<BlockDatastore>,
    ) -> Self {
        Self {
            config,
            client,
            datastore,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingests `[min_height, to_height]`, where `to_height` defaults to the
    /// chain's latest height.
    pub async fn ingest(&self, to_height: Option<u64>, force: bool) -> Result<IngestReport> {
        self.ingest_range(self.config.min_height, to_height, force).await
    }

    pub async fn ingest_range(
        &self,
        from_height: u64,
        to_height: Option<u64>,
        force: bool,
    ) -> Result<IngestReport> {
        let chain = self.config.name.clone();
        let latest = self.client.latest_height().await?;
        self.config.check_reachable(latest)?;
        let to_height = match to_height {
            Some(h) if h > latest => {
                return Err(Error::Config(format!(
                    "requested height {} on {} exceeds latest block {}",
                    h, chain, latest
                )));
            }
            Some(h) => h,
            None => latest,
        };

        log::info!("Min height: {}", from_height);
        log::info!("Latest block: {}", latest);

        let mut report = IngestReport {
            from_height,
            to_height,
            ..Default::default()
        };
        if from_height > to_height {
            log::info!("Nothing to ingest on {}", chain);
            return Ok(report);
        }

        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut heights = HashMap::new();

        for height in from_height..=to_height {
            let permit = gate.clone().acquire_owned().await?;
            let datastore = self.datastore.clone();
            let client = self.client.clone();
            let task_chain = chain.clone();
            let handle = tasks.spawn(async move {
                let _permit = permit;
                let outcome =
                    index_block(&datastore, client.as_ref(), &task_chain, height, force).await;
                (height, outcome)
            });
            heights.insert(handle.id(), height);

            while let Some(joined) = tasks.try_join_next_with_id() {
                report.record_joined(&mut heights, joined, &chain);
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            report.record_joined(&mut heights, joined, &chain);
        }

        report.failed.sort_unstable();
        log::info!(
            "Ingested {} on heights {}..={}: {} indexed, {} skipped, {} with evidence, {} failed",
            chain,
            report.from_height,
            report.to_height,
            report.indexed,
            report.skipped,
            report.with_evidence,
            report.failed.len()
        );
        Ok(report)
    }
}

/// Ensures the block at `height` is cached, fetching it unless it already is
/// (or `force` is set). Evidence is stored alongside when present.
///
/// The returned height is checked by the client, not here.
pub async fn index_block(
    datastore: &BlockDatastore,
    client: &dyn ChainClient,
    chain: &str,
    height: u64,
    force: bool,
) -> Result<IndexOutcome> {
    if !force && Block::exists(datastore, chain, height).await? {
        log::debug!("Skipping block {} on {}, already cached", height, chain);
        return Ok(IndexOutcome::Skipped);
    }

    let fetched = client.block_at(height).await?;
    fetched.block.save(datastore, chain, height).await?;
    let evidence = match &fetched.evidence {
        Some(evidence) => {
            evidence.save(datastore, chain, height).await?;
            log::info!(
                "Stored {} evidence item(s) at block {} on {}",
                evidence.len(),
                height,
                chain
            );
            true
        }
        None => false,
    };

    log::debug!("Indexed block {} on {}", height, chain);
    Ok(IndexOutcome::Indexed { evidence })
}
