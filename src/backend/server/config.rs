/**
 * Server Configuration
 *
 * Configuration is resolved in three layers, later ones winning:
 *
 * 1. Built-in defaults (suitable for local development)
 * 2. An optional TOML file named by `TASKHUB_CONFIG`
 * 3. Environment variables (`.env` is loaded first by the binary)
 *
 * | Variable           | Field              | Default                          |
 * |--------------------|--------------------|----------------------------------|
 * | `DATABASE_URL`     | `database_url`     | `sqlite://taskhub.db?mode=rwc`   |
 * | `JWT_SECRET`       | `jwt_secret`       | development secret (dev only)    |
 * | `JWT_EXPIRY_HOURS` | `jwt_expiry_hours` | `24`                             |
 * | `SERVER_PORT`      | `port`             | `3001`                           |
 * | `FRONTEND_URL`     | `frontend_url`     | `http://localhost:3000`          |
 * | `BCRYPT_COST`      | `bcrypt_cost`      | `bcrypt::DEFAULT_COST`           |
 * | `APP_ENV`          | `environment`      | `development`                    |
 * | `ADMIN_EMAILS`     | `admin_emails`     | empty                            |
 *
 * `ADMIN_EMAILS` is a comma-separated list. Accounts with a listed email
 * are created as (or promoted to) administrators.
 *
 * Production refuses to start without an explicit `JWT_SECRET`.
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Secret used when none is configured outside production.
pub const DEVELOPMENT_JWT_SECRET: &str = "taskhub-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("{0} must be set in production")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                key: "APP_ENV",
                message: format!("unknown environment '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database_url: String,
    /// Empty means "not configured"
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub port: u16,
    /// Allowed CORS origin
    pub frontend_url: String,
    pub bcrypt_cost: u32,
    pub environment: Environment,
    /// Lowercased after `finalize`
    pub admin_emails: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://taskhub.db?mode=rwc".to_string(),
            jwt_secret: String::new(),
            jwt_expiry_hours: 24,
            port: 3001,
            frontend_url: "http://localhost:3000".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            environment: Environment::Development,
            admin_emails: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `TASKHUB_CONFIG` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TASKHUB_CONFIG") {
            Ok(path) => {
                tracing::info!("Loading configuration from {}", path);
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay values found through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(hours) = lookup("JWT_EXPIRY_HOURS") {
            self.jwt_expiry_hours = parse_value("JWT_EXPIRY_HOURS", &hours)?;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(origin) = lookup("FRONTEND_URL") {
            self.frontend_url = origin;
        }
        if let Some(cost) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_value("BCRYPT_COST", &cost)?;
        }
        if let Some(env) = lookup("APP_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(emails) = lookup("ADMIN_EMAILS") {
            self.admin_emails = emails.split(',').map(str::to_string).collect();
        }
        Ok(())
    }

    /// Validate, and fill the development secret when allowed
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            if self.is_production() {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            tracing::warn!("JWT_SECRET not set, using the development secret");
            self.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        }
        if self.jwt_expiry_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "JWT_EXPIRY_HOURS",
                message: "must be positive".to_string(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                message: "must be between 4 and 31".to_string(),
            });
        }
        self.admin_emails = self
            .admin_emails
            .iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        if axum::http::HeaderValue::from_str(&self.frontend_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "FRONTEND_URL",
                message: "not a valid origin".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim();
        self.admin_emails
            .iter()
            .any(|listed| listed.trim().eq_ignore_ascii_case(email))
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        message: format!("could not parse '{raw}'"),
    })
}
