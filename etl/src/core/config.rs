use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HORIZON_END, DEFAULT_HORIZON_START,
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_MAX_LIFETIME_SECS,
    POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};

// =============================================================================
// Runtime Config
// =============================================================================

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

/// Resolved configuration for one warehouse rebuild
#[derive(Debug, Clone)]
pub struct Config {
    /// Operational database the run reads from
    pub source: PostgresConfig,
    /// Warehouse database the run writes to
    pub warehouse: PostgresConfig,
    /// First day covered by the date dimension
    pub horizon_start: NaiveDate,
    /// Last day covered by the date dimension (inclusive)
    pub horizon_end: NaiveDate,
}

// =============================================================================
// File Config (deserialized)
// =============================================================================

/// PostgreSQL section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgresFileConfig {
    /// Connection URL
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: Option<u64>,
}

/// Date-dimension horizon section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HorizonFileConfig {
    /// First day, ISO format (YYYY-MM-DD)
    pub start: Option<NaiveDate>,
    /// Last day, inclusive, ISO format (YYYY-MM-DD)
    pub end: Option<NaiveDate>,
}

/// Root of the config file (bodega.json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Operational database settings
    pub source: Option<PostgresFileConfig>,
    /// Warehouse database settings
    pub warehouse: Option<PostgresFileConfig>,
    /// Date-dimension horizon settings
    pub horizon: Option<HorizonFileConfig>,
    /// Catch-all for unknown fields (warned about, never fatal)
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Config file (CLI-specified path, or ./bodega.json if present)
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let file_config = Self::file_config(cli)?;
        Self::resolve(file_config, cli)
    }

    fn file_config(cli: &CliConfig) -> Result<FileConfig> {
        let path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                Ok(config)
            }
            None => Ok(FileConfig::default()),
        }
    }

    fn resolve(file: FileConfig, cli: &CliConfig) -> Result<Self> {
        let file_source = file.source.unwrap_or_default();
        let file_warehouse = file.warehouse.unwrap_or_default();
        let file_horizon = file.horizon.unwrap_or_default();

        // A missing URL stays empty here; pool init rejects it with a
        // config error so both flows share one message.
        let source = postgres_section(cli.source_url.clone(), file_source);
        let warehouse = postgres_section(cli.warehouse_url.clone(), file_warehouse);

        let horizon_start = match cli.horizon_start.or(file_horizon.start) {
            Some(day) => day,
            None => DEFAULT_HORIZON_START
                .parse()
                .context("Failed to parse default horizon start")?,
        };
        let horizon_end = match cli.horizon_end.or(file_horizon.end) {
            Some(day) => day,
            None => DEFAULT_HORIZON_END
                .parse()
                .context("Failed to parse default horizon end")?,
        };

        if horizon_end < horizon_start {
            anyhow::bail!(
                "Horizon end {} precedes horizon start {}",
                horizon_end,
                horizon_start
            );
        }

        Ok(Self {
            source,
            warehouse,
            horizon_start,
            horizon_end,
        })
    }
}

fn postgres_section(url_override: Option<String>, file: PostgresFileConfig) -> PostgresConfig {
    PostgresConfig {
        url: url_override.or(file.url).unwrap_or_default(),
        max_connections: file
            .max_connections
            .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
        min_connections: file
            .min_connections
            .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
        acquire_timeout_secs: file
            .acquire_timeout_secs
            .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
        idle_timeout_secs: file
            .idle_timeout_secs
            .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
        max_lifetime_secs: file
            .max_lifetime_secs
            .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
        statement_timeout_secs: file
            .statement_timeout_secs
            .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
    }
}
