//! Configuration management for Timber

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::level::LogLevel;
use crate::rotation::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE, DEFAULT_RETENTION_DAYS};
use crate::sink::DEFAULT_DEVICE_CAPACITY;

/// Rotating file sink settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    /// Whether the file sink is registered
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for log files (default: `<cache dir>/Timber`)
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,

    /// Size in bytes after which a new file is started (default: 1 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Files not modified for this many days are deleted (default: 180)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,

    /// Number of log files kept (default: 5)
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            logs_dir: None,
            max_file_size: default_max_file_size(),
            max_age_days: default_max_age_days(),
            max_files: default_max_files(),
        }
    }
}

/// In-memory device sink settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Messages kept in memory (default: 200)
    #[serde(default = "default_device_capacity")]
    pub capacity: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_device_capacity(),
        }
    }
}

/// Remote HTTP sink settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Endpoint receiving `{"message": ...}` bodies
    pub url: String,

    /// HTTP method (default: "POST")
    #[serde(default = "default_http_method")]
    pub method: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Threshold: "error", "warn", "info", "debug" or "verbose".
    /// Anything else disables logging.
    #[serde(default = "default_level")]
    pub level: String,

    /// Name used in log lines and file names (default: executable name)
    #[serde(default)]
    pub app_name: Option<String>,

    /// Include milliseconds in timestamps
    #[serde(default = "default_true")]
    pub timestamp_millis: bool,

    /// Register the console sink
    #[serde(default = "default_true")]
    pub console: bool,

    /// Location of the persisted state (default: `<data dir>/timber/state.json`)
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub file: FileConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    /// Register the HTTP sink when present
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "verbose".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_age_days() -> u64 {
    DEFAULT_RETENTION_DAYS
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_device_capacity() -> usize {
    DEFAULT_DEVICE_CAPACITY
}

fn default_http_method() -> String {
    "POST".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: default_level(),
            app_name: None,
            timestamp_millis: true,
            console: true,
            file: FileConfig::default(),
            device: DeviceConfig::default(),
            http: None,
            state_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Parsed threshold
    pub fn threshold(&self) -> LogLevel {
        LogLevel::parse(&self.level)
    }

    /// Effective logs directory
    pub fn logs_dir(&self) -> PathBuf {
        self.file.logs_dir.clone().unwrap_or_else(default_logs_dir)
    }

    /// Effective state file
    pub fn state_file_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_file)
    }
}

/// Get the base configuration directory (`<config dir>/timber`)
/// Falls back to ./.timber if no config directory can be determined
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("timber"))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine config directory, using current directory");
            PathBuf::from(".timber")
        })
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default logs directory under the platform cache area
pub fn default_logs_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("Timber")
}

/// Default location of the persisted state
pub fn default_state_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("timber"))
        .unwrap_or_else(|| std::env::temp_dir().join("timber"))
        .join("state.json")
}
