use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vset_datastore::models::{Block, ValidatorSet};
use vset_datastore::{BlockDatastore, Model};
use vset_rpc::ChainClient;

use crate::{ChainConfig, Error, Result, ValidatorSetChangeEvent};

const PROGRESS_INTERVAL: u64 = 10_000;

/// Reconstructs a chain's validator-set transitions from its cached blocks.
pub struct ChangelogBuilder {
    config: ChainConfig,
    client: Arc<dyn ChainClient>,
    datastore: Arc<BlockDatastore>,
    output_dir: Option<PathBuf>,
}

impl ChangelogBuilder {
    pub fn new(
        config: ChainConfig,
        client: Arc<dyn ChainClient>,
        datastore: Arc<BlockDatastore>,
    ) -> Self {
        Self {
            config,
            client,
            datastore,
            output_dir: Some(PathBuf::from(".")),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Skips writing the changelog file.
    pub fn without_artifact(mut self) -> Self {
        self.output_dir = None;
        self
    }

    pub fn artifact_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_ref()
            .map(|dir| dir.join(artifact_file_name(&self.config.name)))
    }

    /// Scans from the configured minimum height up to `to_height` (latest
    /// when `None`) and stops early at the first uncached block.
    pub async fn build(&self, to_height: Option<u64>) -> Result<Vec<ValidatorSetChangeEvent>> {
        let chain = self.config.name.as_str();
        let to_height = match to_height {
            Some(h) => h,
            None => self.client.latest_height().await?,
        };
        self.config.check_reachable(to_height)?;

        let mut writer = match self.artifact_path() {
            Some(path) => Some(ChangelogWriter::create(&path)?),
            None => None,
        };

        let mut events = Vec::new();
        let mut last_validators_hash = String::new();
        let mut last_content_hash = String::new();

        for height in self.config.min_height..=to_height {
            if height % PROGRESS_INTERVAL == 0 {
                log::info!("Processing block {} on chain {}", height, chain);
            }

            let block = match Block::find_one(&self.datastore, chain, height).await? {
                Some(block) => block,
                None => {
                    log::info!(
                        "No cached block {} on {}, changelog ends at {}",
                        height,
                        chain,
                        height.saturating_sub(1)
                    );
                    break;
                }
            };

            if block.validators_hash == last_validators_hash {
                continue;
            }
            log::debug!(
                "Found new validator set: {} at height {}",
                block.validators_hash,
                block.height
            );

            let validators =
                validator_set_at(&self.datastore, self.client.as_ref(), chain, height).await?;
            let content_hash = validators.content_hash();

            let event = ValidatorSetChangeEvent {
                height,
                timestamp: block.time,
                previous_validators_hash: std::mem::replace(
                    &mut last_validators_hash,
                    block.validators_hash.clone(),
                ),
                validators_hash: block.validators_hash,
                previous_content_hash: std::mem::replace(
                    &mut last_content_hash,
                    content_hash.clone(),
                ),
                content_hash,
            };

            if let Some(writer) = writer.as_mut() {
                writer.append(&event)?;
            }
            events.push(event);
        }

        log::info!("Found {} validator set changes on {}", events.len(), chain);
        Ok(events)
    }
}

pub fn artifact_file_name(chain: &str) -> String {
    format!("validatorset-{}.csv", chain)
}

/// Returns the validator set at `height`, consulting the cache first and
/// memoizing what the chain returns.
pub async fn validator_set_at(
    datastore: &BlockDatastore,
    client: &dyn ChainClient,
    chain: &str,
    height: u64,
) -> Result<ValidatorSet> {
    if let Some(set) = ValidatorSet::find_one(datastore, chain, height).await? {
        return Ok(set);
    }
    let set = ValidatorSet::new(client.validators_at(height).await?);
    if let Err(e) = set.save(datastore, chain, height).await {
        log::error!("failed to save validators for block {} to db: {}", height, e);
    }
    Ok(set)
}

/// Append-only changelog file, flushed after every event so a partial run
/// still leaves usable output.
pub struct ChangelogWriter {
    file: BufWriter<File>,
    path: PathBuf,
}

impl ChangelogWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, event: &ValidatorSetChangeEvent) -> Result<()> {
        writeln!(self.file, "{}", event.to_csv_line())?;
        self.file.flush()?;
        Ok(())
    }
}

pub fn read_changelog(path: &Path) -> Result<Vec<ValidatorSetChangeEvent>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = ValidatorSetChangeEvent::from_csv_line(&line)
            .map_err(|reason| Error::Changelog { line: index + 1, reason })?;
        events.push(event);
    }
    Ok(events)
}
