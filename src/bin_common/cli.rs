//! CLI utilities for binaries
//!
//! Handles configuration loading and environment variables
//! for all binary executables.

use livenews::{ConfigError, LiveNewsConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Live news client configuration (config/live_news.yaml)
    LiveNews,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::LiveNews => "config/live_news.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::LiveNews => "LIVE_NEWS_CONFIG_PATH",
            ConfigType::Custom(_) => "CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use livenews_dashboard::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::LiveNews);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Load the live news config from `path`, or from the environment alone
/// when the file does not exist
pub fn load_live_news_config(path: &Path) -> Result<LiveNewsConfig, ConfigError> {
    if path.exists() {
        info!("Loading live news config from {}", path.display());
        LiveNewsConfig::load(path)
    } else {
        info!("No config file at {}, using defaults", path.display());
        LiveNewsConfig::from_env()
    }
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
