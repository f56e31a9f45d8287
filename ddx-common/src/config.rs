//! Configuration loading for the preview player
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (DDX_API_BASE_URL, DDX_PREVIEW_TTL_SECS)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! A missing TOML file is not an error: a warning is logged and defaults
//! apply. An unreadable or malformed file is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DDX_CONFIG";
/// Environment override for `api_base_url`
pub const API_BASE_URL_ENV: &str = "DDX_API_BASE_URL";
/// Environment override for `preview_ttl_secs`
pub const PREVIEW_TTL_ENV: &str = "DDX_PREVIEW_TTL_SECS";

/// Player configuration as read from `player.toml`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    /// REST API root, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Lifetime of a cached signed preview URL
    #[serde(default = "default_preview_ttl_secs")]
    pub preview_ttl_secs: u64,

    /// Number of upcoming tracks to prefetch after dispatch
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// HTTP request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Events buffered per queue bus subscriber
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_preview_ttl_secs() -> u64 {
    120
}

fn default_lookahead() -> usize {
    3
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_bus_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            preview_ttl_secs: default_preview_ttl_secs(),
            lookahead: default_lookahead(),
            request_timeout_ms: default_request_timeout_ms(),
            bus_capacity: default_bus_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
}

impl PlayerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file; a missing file yields defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {:?} not found, using built-in defaults", path);
            return Ok(Self::default());
        }

        let toml_str = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration applying file, environment and CLI priority
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match resolve_config_path(overrides.config_path.as_deref()) {
            Some(path) => Self::from_file(&path)?,
            None => {
                warn!("No config directory available, using built-in defaults");
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            config.api_base_url = url;
        }

        if let Ok(ttl) = std::env::var(PREVIEW_TTL_ENV) {
            config.preview_ttl_secs = ttl.parse().map_err(|e| {
                Error::Config(format!("Invalid {} value {:?}: {}", PREVIEW_TTL_ENV, ttl, e))
            })?;
        }

        if let Some(url) = overrides.api_base_url {
            config.api_base_url = url;
        }

        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.preview_ttl_secs == 0 {
            return Err(Error::Config("preview_ttl_secs must be greater than zero".to_string()));
        }
        if self.bus_capacity == 0 {
            return Err(Error::Config("bus_capacity must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn preview_ttl(&self) -> Duration {
        Duration::from_secs(self.preview_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Config file location: CLI path, then `DDX_CONFIG`, then
/// `<config_dir>/drilldex/player.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|d| d.join("drilldex").join("player.toml"))
}
