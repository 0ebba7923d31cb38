use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vset_analysis::config::PROVIDER_CHAIN;
use vset_analysis::ingest::DEFAULT_CONCURRENCY;
use vset_analysis::{ChainConfig, ChainHandle, Pipeline};
use vset_datastore::BlockDatastore;
use vset_rpc::HttpChainClient;

pub const DEFAULT_DB_FILE: &str = "database.db";
pub const DEFAULT_PROVIDER_ADDR: &str = "http://localhost:26657";
pub const DEFAULT_PROVIDER_MIN_HEIGHT: u64 = 1;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    pub db_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub chains: HashMap<String, ChainEntry>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ChainEntry {
    pub rpc_addr: Option<String>,
    pub min_height: Option<u64>,
}

pub fn read_config(path: &Path) -> Result<ConfigFile> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open config file {}", path.display()))?;
    let config: ConfigFile = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Flags shared by every command that touches the cache.
#[derive(Debug, Args)]
pub struct ConfigOpts {
    /// JSON config file with db_file, output_dir, concurrency and chains.
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(long, env = "DB_FILE")]
    pub db_file: Option<PathBuf>,

    /// Directory receiving validatorset-{chain}.csv files.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of blocks fetched at once.
    #[clap(long)]
    pub concurrency: Option<usize>,
}

/// Resolved process settings. Environment variables win over the config
/// file, which wins over built-in defaults.
#[derive(Debug)]
pub struct Settings {
    pub db_file: PathBuf,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    chains: HashMap<String, ChainEntry>,
    env: HashMap<String, String>,
}

impl Settings {
    pub fn load(opts: &ConfigOpts) -> Result<Self> {
        let file = match &opts.config {
            Some(path) => read_config(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(opts, file, std::env::vars().collect())
    }

    pub fn resolve(
        opts: &ConfigOpts,
        file: ConfigFile,
        env: HashMap<String, String>,
    ) -> Result<Self> {
        let concurrency = opts.concurrency.or(file.concurrency).unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(Self {
            db_file: opts
                .db_file
                .clone()
                .or(file.db_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            output_dir: opts
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            concurrency,
            chains: file.chains,
            env,
        })
    }

    /// Builds the configuration of chain `name` from `{NAME}_ADDR` and
    /// `{NAME}_MIN_HEIGHT`, falling back to the config file. Only the
    /// provider has defaults.
    pub fn chain_config(&self, name: &str) -> Result<ChainConfig> {
        let prefix = ChainConfig::env_prefix(name);
        let entry = self.chains.get(name).cloned().unwrap_or_default();
        let is_provider = name == PROVIDER_CHAIN;

        let addr_var = format!("{}_ADDR", prefix);
        let rpc_addr = match self.env.get(&addr_var).cloned().or(entry.rpc_addr) {
            Some(addr) => addr,
            None if is_provider => DEFAULT_PROVIDER_ADDR.to_string(),
            None => bail!(
                "no RPC address for chain {}: set {} or add it to the config file",
                name,
                addr_var
            ),
        };

        let height_var = format!("{}_MIN_HEIGHT", prefix);
        let min_height = match self.env.get(&height_var) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid {} {:?}", height_var, raw))?,
            None => match entry.min_height {
                Some(height) => height,
                None if is_provider => DEFAULT_PROVIDER_MIN_HEIGHT,
                None => bail!(
                    "no minimum height for chain {}: set {} or add it to the config file",
                    name,
                    height_var
                ),
            },
        };

        Ok(ChainConfig::new(name, &rpc_addr, min_height)?)
    }

    pub fn chain(&self, name: &str) -> Result<ChainHandle> {
        let config = self.chain_config(name)?;
        let client = HttpChainClient::new(&config.name, &config.rpc_addr)?;
        Ok(ChainHandle::new(config, Arc::new(client)))
    }

    pub fn open_datastore(&self) -> Result<Arc<BlockDatastore>> {
        let datastore = BlockDatastore::new(&self.db_file)
            .with_context(|| format!("Failed to open database {}", self.db_file.display()))?;
        Ok(Arc::new(datastore))
    }

    pub fn pipeline(&self) -> Result<Pipeline> {
        Ok(Pipeline::new(self.open_datastore()?)
            .with_output_dir(&self.output_dir)
            .with_concurrency(self.concurrency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn opts() -> ConfigOpts {
        ConfigOpts {
            config: None,
            db_file: None,
            output_dir: None,
            concurrency: None,
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&opts(), ConfigFile::default(), HashMap::new()).unwrap();
        assert_eq!(settings.db_file, PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);

        let provider = settings.chain_config(PROVIDER_CHAIN).unwrap();
        assert_eq!(provider.rpc_addr, DEFAULT_PROVIDER_ADDR);
        assert_eq!(provider.min_height, DEFAULT_PROVIDER_MIN_HEIGHT);
        assert!(settings.chain_config("neutron").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = ConfigFile::default();
        file.db_file = Some(PathBuf::from("from-file.db"));
        file.chains.insert(
            "stride-1".to_string(),
            ChainEntry {
                rpc_addr: Some("http://file:26657".to_string()),
                min_height: Some(7),
            },
        );
        let settings = Settings::resolve(
            &opts(),
            file,
            env(&[("STRIDE_1_ADDR", "http://env:26657"), ("PROVIDER_MIN_HEIGHT", "500")]),
        )
        .unwrap();

        assert_eq!(settings.db_file, PathBuf::from("from-file.db"));
        let consumer = settings.chain_config("stride-1").unwrap();
        assert_eq!(consumer.rpc_addr, "http://env:26657");
        assert_eq!(consumer.min_height, 7);
        assert_eq!(settings.chain_config(PROVIDER_CHAIN).unwrap().min_height, 500);
    }

    #[test]
    fn test_flags_override_file() {
        let mut flags = opts();
        flags.db_file = Some(PathBuf::from("flag.db"));
        flags.concurrency = Some(4);
        let file = ConfigFile {
            db_file: Some(PathBuf::from("file.db")),
            concurrency: Some(64),
            ..Default::default()
        };
        let settings = Settings::resolve(&flags, file, HashMap::new()).unwrap();
        assert_eq!(settings.db_file, PathBuf::from("flag.db"));
        assert_eq!(settings.concurrency, 4);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let settings = Settings::resolve(
            &opts(),
            ConfigFile::default(),
            env(&[("PROVIDER_MIN_HEIGHT", "-3"), ("NEUTRON_ADDR", "http://n:26657")]),
        )
        .unwrap();
        assert!(settings.chain_config(PROVIDER_CHAIN).is_err());
        // address without a minimum height
        assert!(settings.chain_config("neutron").is_err());

        let mut zero = opts();
        zero.concurrency = Some(0);
        assert!(Settings::resolve(&zero, ConfigFile::default(), HashMap::new()).is_err());
    }

    #[test]
    fn test_read_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"db_file": "cache.db", "concurrency": 8, "chains": {{"neutron": {{"rpc_addr": "http://n:26657", "min_height": 10}}}}}}"#
        )
        .unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(config.db_file, Some(PathBuf::from("cache.db")));
        assert_eq!(config.concurrency, Some(8));
        assert_eq!(config.chains["neutron"].min_height, Some(10));
        assert!(config.output_dir.is_none());

        assert!(read_config(Path::new("/nonexistent/vset-detect.json")).is_err());
    }
}
