//! Configuration module for the coffee shop API

mod auth;
mod server;

pub use auth::AuthConfig;
pub use server::ServerConfig;

use coffee_shop_common::config::{self as loader, ConfigLoader};
use coffee_shop_common::ConfigurationError as ConfigError;
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "coffee-shop-api.toml";

/// Prefix for environment overrides, e.g. `COFFEE_SHOP_API_SERVER__BIND_ADDRESS`
pub const ENV_PREFIX: &str = "COFFEE_SHOP_API_";

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite:coffee-shop.db` or `sqlite::memory:`
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:coffee-shop.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Main configuration structure for the coffee shop API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token validation configuration
    pub auth: AuthConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => <Config as ConfigLoader<Config>>::load_from_file(path),
            None => <Config as ConfigLoader<Config>>::load(None),
        }
    }

    /// Generate example configuration file
    pub fn generate_example() -> Result<String, ConfigError> {
        loader::to_toml(&Self::default())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout)
    }
}

impl ConfigLoader<Config> for Config {
    fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        loader::extract(loader::layered::<Config>(&path, ENV_PREFIX))
    }

    fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                reason: format!("file {} does not exist", path.display()),
            });
        }
        loader::extract(loader::layered::<Config>(path, ENV_PREFIX))
    }

    fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<(), ConfigError> {
        let figment = Figment::from(Serialized::defaults(config.clone()))
            .merge(Env::prefixed(prefix).split("__"));

        *config = loader::extract(figment)?;

        Ok(())
    }
}
