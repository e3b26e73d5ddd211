//! Authentication configuration

use coffee_shop_common::auth_constants::{
    auth0_audience, auth0_domain, auth0_issuer, issuer_for_domain,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auth0 token validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Auth0 tenant domain, e.g. `my-tenant.us.auth0.com`
    pub domain: String,

    /// Expected `aud` claim
    pub audience: String,

    /// Expected `iss` claim. Derived from `domain` when empty.
    pub issuer: String,

    /// JWKS endpoint override. Derived from `domain` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_url: Option<String>,

    /// JWKS cache TTL in seconds
    pub jwks_cache_ttl: u64,

    /// Allowed clock skew for `exp`/`nbf` in seconds
    pub allowed_clock_skew: u64,

    /// Timeout for fetching the JWKS in seconds
    pub jwks_fetch_timeout: u64,

    /// Minimum seconds between forced JWKS refreshes triggered by an unknown `kid`
    pub jwks_min_refresh_interval: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: auth0_domain(),
            audience: auth0_audience(),
            issuer: auth0_issuer(),
            jwks_url: None,
            jwks_cache_ttl: 3600,
            allowed_clock_skew: 60,
            jwks_fetch_timeout: 10,
            jwks_min_refresh_interval: 30,
        }
    }
}

impl AuthConfig {
    /// Effective JWKS endpoint
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => {
                let issuer = issuer_for_domain(&self.domain);
                format!("{issuer}.well-known/jwks.json")
            }
        }
    }

    /// Effective issuer
    pub fn issuer(&self) -> String {
        if self.issuer.is_empty() {
            issuer_for_domain(&self.domain)
        } else {
            self.issuer.clone()
        }
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl)
    }

    pub fn allowed_clock_skew(&self) -> Duration {
        Duration::from_secs(self.allowed_clock_skew)
    }

    pub fn jwks_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.jwks_fetch_timeout)
    }

    pub fn jwks_min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.jwks_min_refresh_interval)
    }
}
