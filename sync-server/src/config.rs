//! Configuration loading for the sync server.
//!
//! Configuration is loaded from a TOML file (default: `server.toml`).
//! Every field has a default, so a missing section or an absent file
//! yields a usable development configuration.

use serde::Deserialize;
use std::path::PathBuf;
use sync_types::MAX_SYNC_SIZE;

/// Root configuration for the sync server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Write rate limiting configuration.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Limiter sweep task configuration.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener (default: 0.0.0.0:8080).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Seconds before an in-flight request is cut off with a 408
    /// (default: 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one blob file per sync id (default: `data`).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Maximum accepted blob size in bytes (default: 2MB).
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: usize,
}

/// Write rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Minimum seconds between accepted writes per id (default: 30).
    #[serde(default = "default_put_interval_secs")]
    pub put_interval_secs: u64,
}

/// Limiter sweep task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Sweep interval in seconds (default: 300).
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Enable the sweep task (default: true).
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_blob_size() -> usize {
    MAX_SYNC_SIZE
}

fn default_put_interval_secs() -> u64 {
    30
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_blob_size: default_max_blob_size(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            put_interval_secs: default_put_interval_secs(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval(),
            enabled: default_sweep_enabled(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
