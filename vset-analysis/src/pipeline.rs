use std::path::PathBuf;
use std::sync::Arc;
use vset_datastore::BlockDatastore;
use vset_rpc::ChainClient;

use crate::ingest::DEFAULT_CONCURRENCY;
use crate::{
    ChainConfig, ChangelogBuilder, ConsistencyChecker, ConsistencyReport, IngestReport, Ingestor,
    OrderingPolicy, Result,
};

/// A chain's configuration together with the client that reaches it.
#[derive(Clone)]
pub struct ChainHandle {
    pub config: ChainConfig,
    pub client: Arc<dyn ChainClient>,
}

impl ChainHandle {
    pub fn new(config: ChainConfig, client: Arc<dyn ChainClient>) -> Self {
        Self { config, client }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Ingest, changelog and consistency steps sharing one datastore.
pub struct Pipeline {
    datastore: Arc<BlockDatastore>,
    output_dir: Option<PathBuf>,
    concurrency: usize,
    policy: OrderingPolicy,
}

impl Pipeline {
    pub fn new(datastore: Arc<BlockDatastore>) -> Self {
        Self {
            datastore,
            output_dir: Some(PathBuf::from(".")),
            concurrency: DEFAULT_CONCURRENCY,
            policy: OrderingPolicy::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn without_artifacts(mut self) -> Self {
        self.output_dir = None;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn datastore(&self) -> &Arc<BlockDatastore> {
        &self.datastore
    }

    pub fn ingestor(&self, chain: &ChainHandle) -> Ingestor {
        Ingestor::new(chain.config.clone(), chain.client.clone(), self.datastore.clone())
            .with_concurrency(self.concurrency)
    }

    pub fn changelog_builder(&self, chain: &ChainHandle) -> ChangelogBuilder {
        let builder = ChangelogBuilder::new(
            chain.config.clone(),
            chain.client.clone(),
            self.datastore.clone(),
        );
        match &self.output_dir {
            Some(dir) => builder.with_output_dir(dir.clone()),
            None => builder.without_artifact(),
        }
    }

    pub async fn ingest(
        &self,
        chain: &ChainHandle,
        to_height: Option<u64>,
        force: bool,
    ) -> Result<IngestReport> {
        self.ingestor(chain).ingest(to_height, force).await
    }

    /// Builds both changelogs concurrently and classifies the consumer's
    /// events against the provider's.
    pub async fn check(
        &self,
        provider: &ChainHandle,
        consumer: &ChainHandle,
        to_height: Option<u64>,
    ) -> Result<ConsistencyReport> {
        let provider_builder = self.changelog_builder(provider);
        let consumer_builder = self.changelog_builder(consumer);
        let (provider_events, consumer_events) =
            tokio::try_join!(provider_builder.build(to_height), consumer_builder.build(to_height))?;

        log::info!(
            "Found {} validator hashes in consumer {}",
            consumer_events.len(),
            consumer.name()
        );
        log::info!("Found {} validator hashes in provider", provider_events.len());

        let report = ConsistencyChecker::new(&provider_events)
            .with_policy(self.policy)
            .check(&consumer_events);

        log::info!("Found {} missing validator hashes", report.missing_count());
        log::info!(
            "Found {} not existed on provider chain at that time",
            report.not_yet_existed_count()
        );
        log::info!("Found {} out of order validator hashes", report.out_of_order_count());
        Ok(report)
    }
}
