use anyhow::{anyhow, Result};
use clap::Parser;
use vset_datastore::models::{Block, Evidence};
use vset_datastore::Model;

use crate::config::{ConfigOpts, Settings};

#[derive(Debug, Parser)]
pub struct Opts {
    chain: String,

    height: u64,

    #[clap(flatten)]
    settings: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let datastore = Settings::load(&opts.settings)?.open_datastore()?;

    let block = Block::find_one(&datastore, &opts.chain, opts.height)
        .await?
        .ok_or_else(|| anyhow!("block {} on {} is not cached", opts.height, opts.chain))?;
    println!("{}", serde_json::to_string_pretty(&block)?);

    if let Some(evidence) = Evidence::find_one(&datastore, &opts.chain, opts.height).await? {
        println!("evidence:");
        println!("{}", serde_json::to_string_pretty(&evidence)?);
    }

    Ok(())
}
