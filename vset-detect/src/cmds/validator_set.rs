use anyhow::{anyhow, Result};
use clap::Parser;
use vset_datastore::models::Block;
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
    let signers = block
        .signer_addresses()
        .ok_or_else(|| anyhow!("block {} on {} has no last commit", opts.height, opts.chain))?;

    println!("validators hash: {}", block.validators_hash);
    println!("signers ({}):", signers.len());
    for address in signers {
        println!("  {}", address);
    }

    Ok(())
}
