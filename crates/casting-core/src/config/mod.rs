//! Configuration for the casting agency service.
//!
//! Configuration is read from a TOML file and then overlaid with a small set
//! of environment variables so that deployments can keep secrets and
//! per-environment values out of the file:
//!
//! | Variable | Overrides |
//! |---|---|
//! | `DATABASE_URL` | `database.url` |
//! | `AUTH0_DOMAIN` | `auth.domain` |
//! | `API_AUDIENCE` | `auth.audience` |
//! | `CASTING_BIND` | `server.bind` |

pub mod auth;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use auth::AuthConfig;
pub use server::{DatabaseConfig, PaginationConfig, ServerConfig};

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Overlay environment overrides. `lookup` is usually
    /// `|k| std::env::var(k).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(domain) = non_empty("AUTH0_DOMAIN") {
            self.auth.domain = domain;
        }
        if let Some(audience) = non_empty("API_AUDIENCE") {
            self.auth.audience = audience;
        }
        if let Some(bind) = non_empty("CASTING_BIND") {
            self.server.bind = bind;
        }
    }

    /// Check that the values needed to serve requests are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        let url = self.database.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Config("database.url is empty".to_string()));
        }
        if !url.starts_with("sqlite:") {
            let scheme = url.split(':').next().unwrap_or(url);
            return Err(ConfigError::Config(format!(
                "database.url uses `{scheme}`; only sqlite:// URLs are supported \
                 (check DATABASE_URL)"
            )));
        }
        if self.pagination.items_per_page == 0 {
            return Err(ConfigError::Config(
                "pagination.items_per_page must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
