use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid RPC address: {0}")]
    InvalidAddress(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },

    #[error("Failed to decode RPC response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("RPC response for {0} carried no result")]
    EmptyResult(String),

    #[error("Unexpected block height: requested {requested}, got {returned}")]
    UnexpectedHeight { requested: u64, returned: u64 },

    #[error("Not found: {0}")]
    NotFound(String),
}
