use crate::error::NewsError;
use feedsocket::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const HOST_ENV: &str = "LIVE_NEWS_HOST";
pub const SECURE_ENV: &str = "LIVE_NEWS_SECURE";
pub const TOKEN_ENV: &str = "LIVE_NEWS_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid environment variable {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Live news client configuration
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveNewsConfig {
    /// Host and optional port, e.g. `localhost:8000`
    pub host: String,
    /// Feed path on the host
    pub path: String,
    /// Use `wss` instead of `ws`
    pub secure: bool,
    /// Delay before the first reconnect; doubles on every further attempt
    pub reconnect_base_delay_ms: u64,
    /// Upper bound on any single reconnect delay
    ///
    /// With the default base of 1 s and 5 attempts the schedule (1, 2, 4, 8,
    /// 16 s) never reaches it. Raise it together with a large base to keep
    /// the plain doubling schedule.
    pub max_reconnect_delay_ms: u64,
    /// Reconnect attempts after a lost connection (0 disables reconnecting)
    pub max_reconnect_attempts: usize,
    /// Keep-alive ping period while connected
    pub ping_interval_secs: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for LiveNewsConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8000".to_string(),
            path: "/api/live-news/ws/live-news".to_string(),
            secure: false,
            reconnect_base_delay_ms: 1000,
            max_reconnect_delay_ms: 60_000,
            max_reconnect_attempts: 5,
            ping_interval_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl LiveNewsConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(config_path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without looking at the environment
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `LIVE_NEWS_HOST` and `LIVE_NEWS_SECURE` from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV) {
            info!("Overriding host from environment variable");
            self.host = host;
        }

        if let Some(secure) = lookup(SECURE_ENV) {
            self.secure = match secure.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnvVar {
                        name: SECURE_ENV.to_string(),
                        value: secure,
                    })
                }
            };
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "host must not be empty".to_string(),
            ));
        }

        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "path must start with '/'".to_string(),
            ));
        }

        if self.max_reconnect_delay_ms < self.reconnect_base_delay_ms {
            return Err(ConfigError::ValidationError(
                "max_reconnect_delay_ms must not be below reconnect_base_delay_ms".to_string(),
            ));
        }

        if self.ping_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ping_interval_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }

    /// Backoff for lost connections: attempt `n` waits `base * 2^(n-1)`,
    /// capped at `max_reconnect_delay_ms`
    pub fn reconnect_strategy(&self) -> Box<dyn ReconnectionStrategy> {
        if self.max_reconnect_attempts == 0 {
            return Box::new(NeverReconnect);
        }
        Box::new(ExponentialBackoff::new(
            self.reconnect_base_delay(),
            self.max_reconnect_delay(),
            Some(self.max_reconnect_attempts),
        ))
    }

    /// Full feed URL, with `token` appended as its own path segment
    ///
    /// The token is percent-encoded; an empty token is ignored.
    pub fn endpoint_url(&self, token: Option<&str>) -> std::result::Result<Url, NewsError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        let mut url = Url::parse(&format!("{scheme}://{}{}", self.host, self.path))
            .map_err(|e| NewsError::InvalidUrl(e.to_string()))?;

        if let Some(token) = token.filter(|token| !token.is_empty()) {
            url.path_segments_mut()
                .map_err(|_| NewsError::InvalidUrl("URL cannot take path segments".to_string()))?
                .pop_if_empty()
                .push(token);
        }

        Ok(url)
    }
}
