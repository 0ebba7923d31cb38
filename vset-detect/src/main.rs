mod cmds;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vset-detect")]
#[command(version = "0.1.0")]
#[command(
    about = "Detects validator-set drift between a provider chain and its consumer chains",
    long_about = None
)]
struct Cli {
    /// Log filter, overridden by RUST_LOG when set.
    #[clap(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch blocks into the local cache
    Index(cmds::index::Opts),

    /// Rebuild a chain's validator-set changelog from cached blocks
    Changelog(cmds::changelog::Opts),

    /// Compare a consumer's changelog against the provider's
    #[command(alias = "view-missing-validator")]
    Check(cmds::check::Opts),

    /// Print a cached block and its evidence
    #[command(alias = "get_block")]
    GetBlock(cmds::get_block::Opts),

    /// List every cached evidence entry of a chain
    Evidence(cmds::evidence::Opts),

    /// Print the validators hash and signers recorded in a cached block
    #[command(alias = "validator_set")]
    ValidatorSet(cmds::validator_set::Opts),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    match &cli.command {
        Commands::Index(opts) => cmds::index::run(opts).await?,
        Commands::Changelog(opts) => cmds::changelog::run(opts).await?,
        Commands::Check(opts) => cmds::check::run(opts).await?,
        Commands::GetBlock(opts) => cmds::get_block::run(opts).await?,
        Commands::Evidence(opts) => cmds::evidence::run(opts).await?,
        Commands::ValidatorSet(opts) => cmds::validator_set::run(opts).await?,
    }

    Ok(())
}
