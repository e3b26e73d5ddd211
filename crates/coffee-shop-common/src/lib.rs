//! Core shared pieces for the coffee shop services: logging setup,
//! layered configuration loading and the default identity-provider settings.

pub mod auth_constants;
pub mod config;
pub mod error;
pub mod logging;

pub use auth_constants::{auth0_audience, auth0_domain, auth0_issuer};
pub use config::ConfigLoader;
pub use error::ConfigurationError;
