pub mod client;
mod error;
pub mod http_client;
pub mod types;

pub use client::{ChainClient, FetchedBlock};
pub use error::RpcError;
pub use http_client::HttpChainClient;

pub type Result<T> = std::result::Result<T, RpcError>;
