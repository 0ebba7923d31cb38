use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] vset_rpc::RpcError),

    #[error("Datastore error: {0}")]
    Datastore(#[from] vset_datastore::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid changelog line {line}: {reason}")]
    Changelog { line: usize, reason: String },

    #[error("Concurrency gate closed: {0}")]
    Gate(#[from] tokio::sync::AcquireError),
}
