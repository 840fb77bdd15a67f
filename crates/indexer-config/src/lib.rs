//! Layered configuration, per §6: built-in defaults, an optional TOML file,
//! and environment overrides on top. Mirrors the teacher's own `confy`
//! single-file loading with the env-var layer spec.md §6 additionally
//! requires — `figment` is pulled in for that layer (see DESIGN.md).

use std::{path::Path, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePoolOverride {
    pub max_idle: Option<u32>,
    pub max_open: Option<u32>,
    pub max_lifetime: Option<u64>,
}

impl Default for DatabasePoolOverride {
    fn default() -> Self {
        Self { max_idle: None, max_open: None, max_lifetime: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub hostname: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_idle: u32,
    pub max_open: u32,
    pub max_lifetime: u64,
    pub sync: DatabasePoolOverride,
    pub backfill: DatabasePoolOverride,
    pub resync: DatabasePoolOverride,
    pub server: DatabasePoolOverride,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".into(),
            port: 5432,
            name: "statediff_indexer".into(),
            user: "postgres".into(),
            password: String::new(),
            max_idle: 0,
            max_open: 10,
            max_lifetime: 0,
            sync: DatabasePoolOverride::default(),
            backfill: DatabasePoolOverride::default(),
            resync: DatabasePoolOverride::default(),
            server: DatabasePoolOverride::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumConfig {
    pub ws_path: String,
    pub http_path: String,
    pub node_id: String,
    pub client_name: String,
    pub genesis_block: String,
    pub network_id: String,
    pub chain_id: u64,
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self {
            ws_path: String::new(),
            http_path: String::new(),
            node_id: String::new(),
            client_name: String::new(),
            genesis_block: String::new(),
            network_id: "1".into(),
            chain_id: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub workers: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    #[serde(with = "humantime_serde")]
    pub frequency: Duration,
    pub batch_size: u64,
    pub workers: usize,
    pub validation_level: i32,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            frequency: Duration::from_secs(30),
            batch_size: 100,
            workers: 1,
            validation_level: 1,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResyncType {
    Full,
    Headers,
    Transactions,
    Receipts,
    State,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResyncConfig {
    #[serde(rename = "type")]
    pub kind: ResyncType,
    pub start: u64,
    pub stop: u64,
    pub batch_size: u64,
    pub workers: usize,
    pub clear_old_cache: bool,
    pub reset_validation: bool,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            kind: ResyncType::Full,
            start: 0,
            stop: 0,
            batch_size: 100,
            workers: 1,
            clear_old_cache: false,
            reset_validation: false,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub logfile: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), logfile: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ethereum: EthereumConfig,
    pub sync: SyncConfig,
    pub backfill: BackfillConfig,
    pub resync: ResyncConfig,
    pub log: LogConfig,
    pub metrics: bool,
}

/// Environment variables are prefixed `STATEDIFF_INDEXER_` and nest with a
/// double underscore, e.g. `STATEDIFF_INDEXER_DATABASE__HOSTNAME`,
/// `STATEDIFF_INDEXER_BACKFILL__BATCH_SIZE`. This is a concrete reading of
/// spec.md §6's "environment variables mirror each config key" — recorded
/// as a resolved open question in DESIGN.md.
const ENV_PREFIX: &str = "STATEDIFF_INDEXER_";

/// Loads configuration by layering, in increasing precedence: built-in
/// defaults, an optional TOML file, then environment variables.
pub fn load(toml_path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

    if let Some(path) = toml_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.hostname.is_empty() {
        return Err(ConfigError::Invalid("database.hostname is required".into()));
    }
    if config.sync.workers < 1 {
        return Err(ConfigError::Invalid("sync.workers must be at least 1".into()));
    }
    if config.backfill.frequency < Duration::from_secs(1) {
        return Err(ConfigError::Invalid("backfill.frequency must be at least 1s".into()));
    }
    if config.backfill.timeout < Duration::from_secs(15) {
        return Err(ConfigError::Invalid("backfill.timeout must be at least 15s".into()));
    }
    if config.resync.timeout < Duration::from_secs(5) {
        return Err(ConfigError::Invalid("resync.timeout must be at least 5s".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_satisfy_their_own_minimums() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"
            [database]
            hostname = "db.internal"
            name = "indexer"
            user = "indexer"

            [backfill]
            frequency = "1m"
        "#)
        .unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.database.hostname, "db.internal");
        assert_eq!(config.backfill.frequency, Duration::from_secs(60));
    }

    #[test]
    fn rejects_sub_minimum_backfill_frequency() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"
            [database]
            hostname = "db.internal"

            [backfill]
            frequency = "500ms"
        "#)
        .unwrap();

        let result = load(Some(file.path()));
        assert!(result.is_err());
    }
}
