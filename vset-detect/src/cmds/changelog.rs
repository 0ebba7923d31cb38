use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{ConfigOpts, Settings};

#[derive(Debug, Parser)]
pub struct Opts {
    /// Chain name, `provider` or a consumer.
    chain: String,

    /// Last height to scan, defaults to the chain's latest block.
    #[clap(long)]
    to_height: Option<u64>,

    #[clap(flatten)]
    settings: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let settings = Settings::load(&opts.settings)?;
    let chain = settings.chain(&opts.chain)?;
    let builder = settings.pipeline()?.changelog_builder(&chain);

    let events = builder
        .build(opts.to_height)
        .await
        .with_context(|| format!("Failed to build changelog for {}", opts.chain))?;

    for event in &events {
        println!("{}", event);
    }
    if let Some(path) = builder.artifact_path() {
        println!("Wrote {} validator set changes to {}", events.len(), path.display());
    }

    Ok(())
}
