use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use vset_analysis::config::PROVIDER_CHAIN;
use vset_datastore::RecordKind;

use crate::config::{ConfigOpts, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Provider,
    Consumer,
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(value_enum)]
    target: Target,

    /// Consumer chain name, required with `consumer`.
    name: Option<String>,

    /// Last height to fetch, defaults to the chain's latest block.
    #[clap(long)]
    to_height: Option<u64>,

    /// Refetch blocks that are already cached.
    #[clap(long)]
    force: bool,

    #[clap(flatten)]
    settings: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let name = match (opts.target, &opts.name) {
        (Target::Provider, None) => PROVIDER_CHAIN.to_string(),
        (Target::Provider, Some(name)) => bail!("unexpected chain name {} for the provider", name),
        (Target::Consumer, Some(name)) => name.clone(),
        (Target::Consumer, None) => bail!("index consumer requires a chain name"),
    };

    let settings = Settings::load(&opts.settings)?;
    let chain = settings.chain(&name)?;
    if opts.target == Target::Consumer && chain.config.is_provider() {
        bail!("{} is reserved for the provider chain", PROVIDER_CHAIN);
    }

    let pipeline = settings.pipeline()?;
    let report = pipeline
        .ingest(&chain, opts.to_height, opts.force)
        .await
        .with_context(|| format!("Failed to index {}", name))?;
    let cached = pipeline.datastore().count_records(&name, RecordKind::Block).await?;

    println!(
        "Indexed {} blocks on {} ({} already cached, {} with evidence); {} blocks cached in total",
        report.indexed, name, report.skipped, report.with_evidence, cached
    );
    if !report.is_complete() {
        log::error!(
            "{} heights on {} were not indexed, rerun to retry: {:?}",
            report.failed.len(),
            name,
            report.failed
        );
    }

    Ok(())
}
