//! Configuration management for Streamlet.
//!
//! Configuration is read from `~/.config/streamlet/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::FRESHNESS_WINDOW;
use crate::daemon::DaemonConfig;
use crate::fetcher::http_fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::recommended::DEFAULT_CONFIG_URL;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub refresh: RefreshConfig,
    pub recommended: RecommendedSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// A cached feed younger than this is served without a network fetch.
    pub freshness_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_secs: FRESHNESS_WINDOW.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// e.g. "60m", "1h", "1d"
    pub interval: String,
    pub update_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: "60m".to_string(),
            update_on_start: true,
        }
    }
}

impl RefreshConfig {
    pub fn daemon_config(&self) -> Result<DaemonConfig, ConfigError> {
        let interval_secs =
            DaemonConfig::parse_interval(&self.interval).map_err(ConfigError::Invalid)?;
        Ok(DaemonConfig {
            interval_secs,
            update_on_start: self.update_on_start,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendedSettings {
    pub config_url: String,
}

impl Default for RecommendedSettings {
    fn default() -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/streamlet/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("streamlet").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# Streamlet Configuration

[fetch]
# Give up on a feed request after this many seconds
timeout_secs = 10
user_agent = "streamlet/0.1.0"

[cache]
# Cached feeds younger than this are shown without refetching
freshness_secs = 900

[refresh]
# Interval for `streamlet daemon` (e.g., "1h", "30m", "6h", "1d")
interval = "60m"
update_on_start = true

[recommended]
# JSON catalog of recommended feeds: { "categories": [...], "feeds": [...] }
config_url = "https://raw.githubusercontent.com/forsignin/chrome-rss/main/public/feeds-config.json"
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}
