use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use vset_datastore::models::Validator;

use crate::types::{BlockResult, JsonRpcResponse, StatusResult, ValidatorsResult};
use crate::{ChainClient, FetchedBlock, Result, RpcError};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const VALIDATORS_PER_PAGE: u64 = 100;

/// CometBFT JSON-RPC over HTTP GET.
pub struct HttpChainClient {
    name: String,
    addr: String,
    client: Client,
}

impl HttpChainClient {
    pub fn new(name: &str, addr: &str) -> Result<Self> {
        let addr = addr.trim_end_matches('/');
        if !(addr.starts_with("http://") || addr.starts_with("https://")) {
            return Err(RpcError::InvalidAddress(addr.to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            name: name.to_string(),
            addr: addr.to_string(),
            client,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.addr, method);
        log::trace!("GET {} {:?}", url, query);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        match serde_json::from_slice::<JsonRpcResponse<T>>(&body) {
            Ok(parsed) => parsed.into_result(method),
            Err(_) if !status.is_success() => Err(RpcError::Http {
                status: status.as_u16(),
                url,
            }),
            Err(e) => Err(RpcError::Decode(e)),
        }
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn latest_height(&self) -> Result<u64> {
        let status: StatusResult = self.call("status", &[]).await?;
        Ok(status.sync_info.latest_block_height)
    }

    async fn block_at(&self, height: u64) -> Result<FetchedBlock> {
        let result: BlockResult = self
            .call("block", &[("height", height.to_string())])
            .await?;
        let fetched = FetchedBlock::from(result.block);
        if fetched.block.height != height {
            return Err(RpcError::UnexpectedHeight {
                requested: height,
                returned: fetched.block.height,
            });
        }
        Ok(fetched)
    }

    async fn validators_at(&self, height: u64) -> Result<Vec<Validator>> {
        let mut validators = Vec::new();
        let mut page = 1u64;
        loop {
            let result: ValidatorsResult = self
                .call(
                    "validators",
                    &[
                        ("height", height.to_string()),
                        ("page", page.to_string()),
                        ("per_page", VALIDATORS_PER_PAGE.to_string()),
                    ],
                )
                .await?;
            let received = result.validators.len();
            validators.extend(result.validators.into_iter().map(Validator::from));
            let total = result.total.unwrap_or(validators.len() as u64);
            if received == 0 || validators.len() as u64 >= total {
                break;
            }
            page += 1;
        }
        log::debug!(
            "Fetched {} validators at height {} from {}",
            validators.len(),
            height,
            self.name
        );
        Ok(validators)
    }
}
