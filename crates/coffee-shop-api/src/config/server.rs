//! HTTP server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Listener and request handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_address: SocketAddr,

    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            request_timeout: 30,
        }
    }
}
