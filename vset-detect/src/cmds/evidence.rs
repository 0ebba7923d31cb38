use anyhow::Result;
use clap::Parser;
use vset_datastore::models::Evidence;
use vset_datastore::{Model, RecordKind};

use crate::config::{ConfigOpts, Settings};

#[derive(Debug, Parser)]
pub struct Opts {
    chain: String,

    #[clap(flatten)]
    settings: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let datastore = Settings::load(&opts.settings)?.open_datastore()?;

    let mut found = Vec::new();
    for record in datastore.records(&opts.chain, RecordKind::Evidence) {
        let (height, value) = record?;
        let evidence = Evidence::from_json_bytes(&Evidence::key_for(&opts.chain, height), &value)?;
        found.push((height, evidence));
    }
    // keys sort lexicographically
    found.sort_by_key(|(height, _)| *height);

    for (height, evidence) in &found {
        println!("block {}: {} item(s)", height, evidence.len());
        println!("{}", serde_json::to_string_pretty(evidence)?);
    }
    println!("Found evidence in {} blocks on {}", found.len(), opts.chain);

    Ok(())
}
