pub mod changelog;
pub mod config;
pub mod consistency;
mod error;
pub mod event;
pub mod ingest;
pub mod pipeline;

pub use changelog::{read_changelog, ChangelogBuilder, ChangelogWriter};
pub use config::ChainConfig;
pub use consistency::{
    check_consistency, Classification, ConsistencyChecker, ConsistencyReport, OrderingPolicy,
};
pub use error::Error;
pub use event::ValidatorSetChangeEvent;
pub use ingest::{IndexOutcome, IngestReport, Ingestor};
pub use pipeline::{ChainHandle, Pipeline};

pub type Result<T> = std::result::Result<T, Error>;
