//! Layered configuration loading
//!
//! Services merge their compiled defaults, an optional TOML file and
//! prefixed environment variables, in that order of increasing priority.

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Loader implemented by each service's top level config type
pub trait ConfigLoader<T>: Sized {
    /// Load configuration, falling back to the service's default file name
    fn load(path: Option<PathBuf>) -> Result<T, ConfigurationError>;

    /// Load configuration from an explicit file
    fn load_from_file(path: &Path) -> Result<T, ConfigurationError>;

    /// Re-apply environment overrides on top of an existing config
    fn apply_env_overrides(config: &mut T, prefix: &str) -> Result<(), ConfigurationError>;
}

/// Build the standard defaults → TOML → environment figment
pub fn layered<T: Serialize + Default>(file: &Path, env_prefix: &str) -> Figment {
    Figment::from(Serialized::defaults(T::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(env_prefix).split("__"))
}

/// Extract a config from a figment, mapping errors into [`ConfigurationError`]
pub fn extract<T: DeserializeOwned>(figment: Figment) -> Result<T, ConfigurationError> {
    figment.extract().map_err(|e| ConfigurationError::ParseError {
        details: e.to_string(),
    })
}

/// Render a config as pretty TOML, used by `--gen-config`
pub fn to_toml<T: Serialize>(config: &T) -> Result<String, ConfigurationError> {
    toml::to_string_pretty(config).map_err(|e| ConfigurationError::ParseError {
        details: format!("Failed to serialize config: {e}"),
    })
}
