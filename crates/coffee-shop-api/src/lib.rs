//! # Coffee Shop API
//!
//! REST API for a coffee shop's drinks menu with role-based access control.
//!
//! ## Features
//!
//! - **Menu**: public short-form listing of drinks and their colored parts
//! - **Management**: create, edit and delete drinks behind Auth0 permissions
//! - **Authentication**: RS256 bearer tokens verified against the tenant JWKS
//! - **Persistence**: SQLite with structured, ordered recipes

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Result};
pub use server::{AppState, Server};

/// Version of the coffee-shop-api crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
