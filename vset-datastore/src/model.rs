use crate::keys::{record_key, RecordKind};
use crate::{BlockDatastore, Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A value stored under `{chain}:{KIND}:{height}`.
#[async_trait]
pub trait Model: Sized + Serialize + DeserializeOwned + Send + Sync {
    const KIND: RecordKind;

    fn key_for(chain: &str, height: u64) -> String {
        record_key(chain, Self::KIND, height)
    }

    fn from_json_bytes(key: &str, data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        })
    }

    fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    async fn save(&self, datastore: &BlockDatastore, chain: &str, height: u64) -> Result<()> {
        let data = self.to_json_bytes()?;
        datastore.put(&Self::key_for(chain, height), &data).await
    }

    async fn find_one(
        datastore: &BlockDatastore,
        chain: &str,
        height: u64,
    ) -> Result<Option<Self>> {
        let key = Self::key_for(chain, height);
        match datastore.get(&key).await? {
            Some(data) => Ok(Some(Self::from_json_bytes(&key, &data)?)),
            None => Ok(None),
        }
    }

    async fn exists(datastore: &BlockDatastore, chain: &str, height: u64) -> Result<bool> {
        datastore.has(&Self::key_for(chain, height)).await
    }
}
