use anyhow::{bail, Context, Result};
use clap::Parser;
use vset_analysis::config::PROVIDER_CHAIN;
use vset_analysis::{OrderingPolicy, ValidatorSetChangeEvent};

use crate::config::{ConfigOpts, Settings};

#[derive(Debug, Parser)]
pub struct Opts {
    /// Consumer chain name.
    consumer: String,

    /// Last height scanned on both chains.
    #[clap(long)]
    to_height: Option<u64>,

    /// Index both chains before checking.
    #[clap(long)]
    ingest: bool,

    /// Treat a predecessor set unknown to the provider as out of order.
    #[clap(long)]
    strict_ordering: bool,

    #[clap(flatten)]
    settings: ConfigOpts,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let settings = Settings::load(&opts.settings)?;
    let provider = settings.chain(PROVIDER_CHAIN)?;
    let consumer = settings.chain(&opts.consumer)?;
    if consumer.config.is_provider() {
        bail!("the consumer must not be the provider chain");
    }

    let policy = if opts.strict_ordering {
        OrderingPolicy::NotFoundIsOutOfOrder
    } else {
        OrderingPolicy::SentinelZero
    };
    let pipeline = settings.pipeline()?.with_policy(policy);

    if opts.ingest {
        for chain in [&provider, &consumer] {
            let report = pipeline
                .ingest(chain, opts.to_height, false)
                .await
                .with_context(|| format!("Failed to index {}", chain.name()))?;
            if !report.is_complete() {
                log::error!("{} heights on {} were not indexed", report.failed.len(), chain.name());
            }
        }
    }

    let report = pipeline
        .check(&provider, &consumer, opts.to_height)
        .await
        .with_context(|| format!("Failed to check {} against the provider", opts.consumer))?;

    print_section("missing from provider", &report.missing);
    print_section("not yet on provider", &report.not_yet_existed);
    print_section("out of order", &report.out_of_order);
    println!(
        "{}: {} consistent, {} missing, {} not yet existed, {} out of order, {} before provider data",
        opts.consumer,
        report.consistent,
        report.missing_count(),
        report.not_yet_existed_count(),
        report.out_of_order_count(),
        report.excluded
    );

    Ok(())
}

fn print_section(title: &str, events: &[ValidatorSetChangeEvent]) {
    if events.is_empty() {
        return;
    }
    println!("{}:", title);
    for event in events {
        println!("  {} hash={}", event, event.validators_hash);
    }
}
