//! Error types shared by the coffee shop crates

use thiserror::Error;

/// Failure while loading or producing configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The merged configuration could not be parsed or serialized
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// A value parsed but is not usable
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
