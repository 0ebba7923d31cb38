use crate::keys::{self, RecordKind};
use crate::{Error, Result};
use rocksdb::{IteratorMode, Options, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Persistent cache of raw chain records, shared by every ingest task and
/// changelog build of a run.
pub struct BlockDatastore {
    db: DB,
    path: PathBuf,
    // keeps the throwaway directory alive for as long as the database is open
    _temp_dir: Option<TempDir>,
}

impl BlockDatastore {
    pub fn new(path: &Path) -> Result<Self> {
        let db = DB::open_default(path)?;
        log::debug!("Opened datastore at {}", path.display());
        Ok(Self {
            db,
            path: path.to_path_buf(),
            _temp_dir: None,
        })
    }

    // "in-memory" database
    pub fn create_in_memory() -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_allow_mmap_reads(false);
        opts.set_compression_type(rocksdb::DBCompressionType::None);
        let temp_dir = tempfile::tempdir()?;
        let temp_path = temp_dir.path().to_path_buf();
        let db = DB::open(&opts, &temp_path)?;
        Ok(Self {
            db,
            path: temp_path,
            _temp_dir: Some(temp_dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.db.get_pinned(key)?.is_some())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key).await? {
            Some(data) => Ok(Some(String::from_utf8(data)?)),
            None => Ok(None),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|source| Error::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub async fn put_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.put(key, &data).await
    }

    /// Iterates every entry whose key starts with `prefix`, in byte order.
    pub fn iterator(
        &self,
        prefix: &str,
    ) -> impl Iterator<Item = Result<(Box<[u8]>, Box<[u8]>)>> + '_ {
        let mut readopts = rocksdb::ReadOptions::default();
        readopts.set_iterate_lower_bound(prefix.as_bytes().to_vec());
        let upper = keys::prefix_upper_bound(prefix);
        if !upper.is_empty() {
            readopts.set_iterate_upper_bound(upper);
        }
        self.db
            .iterator_opt(IteratorMode::Start, readopts)
            .map(|result| result.map_err(|e| Error::Database(e.to_string())))
    }

    /// Iterates the records of one kind on one chain as `(height, value)`.
    ///
    /// Heights arrive in key order, which is lexicographic rather than numeric.
    pub fn records(
        &self,
        chain: &str,
        kind: RecordKind,
    ) -> impl Iterator<Item = Result<(u64, Box<[u8]>)>> + '_ {
        self.iterator(&keys::record_prefix(chain, kind))
            .map(|result| -> Result<(u64, Box<[u8]>)> {
                let (key, value) = result?;
                let key = String::from_utf8(key.to_vec())?;
                let (_, _, height) = keys::parse_record_key(&key)?;
                Ok((height, value))
            })
    }

    pub async fn count_records(&self, chain: &str, kind: RecordKind) -> Result<usize> {
        let mut count = 0;
        for result in self.iterator(&keys::record_prefix(chain, kind)) {
            result?;
            count += 1;
        }
        Ok(count)
    }
}
