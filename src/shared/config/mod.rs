//! Application configuration module
//!
//! Client-facing configuration: where the TaskHub server lives. The server's
//! own settings are in `backend::server::config`.

use thiserror::Error;

/// Default server address, matching the server's default port.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the server, without a trailing slash
    pub server_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rest = self
            .server_url
            .strip_prefix("http://")
            .or_else(|| self.server_url.strip_prefix("https://"))
            .ok_or_else(|| ConfigError::InvalidUrl(self.server_url.clone()))?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        }
        Ok(())
    }

    /// Base URL of the WebSocket endpoint's scheme and authority (`ws://` or `wss://`).
    pub fn socket_base(&self) -> String {
        if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.server_url.clone()
        }
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let server_url = self
            .server_url
            .ok_or(ConfigError::MissingValue("server_url"))?
            .trim_end_matches('/')
            .to_string();
        let config = AppConfig { server_url };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
