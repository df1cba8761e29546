use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Remote lookup service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Search history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Violation lookup service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Service base URL (scheme, host, optional port and path prefix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the violation search endpoint, appended to the base URL
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Path of the liveness endpoint, appended to the base URL
    #[serde(default = "default_liveness_endpoint")]
    pub liveness_endpoint: String,

    /// Lookup timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Liveness probe timeout in milliseconds
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_endpoint: default_search_endpoint(),
            liveness_endpoint: default_liveness_endpoint(),
            timeout_ms: default_timeout_ms(),
            liveness_timeout_ms: default_liveness_timeout_ms(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StorageConfig {
    /// Database file; the user data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Search history configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    /// Number of entries shown as recent searches
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_search_endpoint() -> String {
    "/violations/search".to_string()
}

fn default_liveness_endpoint() -> String {
    "/test".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_liveness_timeout_ms() -> u64 {
    5_000
}

fn default_recent_limit() -> usize {
    crate::database::DEFAULT_RECENT_LIMIT
}

impl Config {
    /// Load the configuration file, or write a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }

    /// Apply command line overrides on top of the loaded file values
    pub fn apply_overrides(&mut self, database_path: Option<PathBuf>, log_level: Option<LogLevel>) {
        if let Some(database_path) = database_path {
            self.storage.database_path = Some(database_path);
        }

        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("Invalid API base URL '{}': {}", self.api.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!(
                "API base URL must use http or https, got '{}'",
                base.scheme()
            ));
        }

        if self.api.search_endpoint.trim().is_empty() {
            return Err(anyhow!("API search endpoint must not be empty"));
        }

        if self.api.timeout_ms == 0 || self.api.liveness_timeout_ms == 0 {
            return Err(anyhow!("API timeouts must be greater than zero"));
        }

        if self.history.recent_limit == 0 {
            return Err(anyhow!("Recent history limit must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            history: HistoryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
