use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, DEFAULT_SERVER_URL};

/// Client configuration: server location plus the current session token.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    app: AppConfig,
    token: Option<String>,
}

impl ClientConfig {
    pub fn new(app: AppConfig) -> Self {
        Self { app, token: None }
    }

    /// Read the server URL from `CLIENT_API_URL`, falling back to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_url =
            std::env::var("CLIENT_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::with_builder(AppConfig::builder().server_url(server_url))
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    /// Full URL for an API path such as `/api/tasks`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    /// URL of the WebSocket endpoint
    pub fn socket_url(&self) -> String {
        format!("{}/socket", self.app.socket_base())
    }
}
