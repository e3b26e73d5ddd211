//! Default Auth0 tenant settings for the coffee shop API
//!
//! These are used when no `auth` section is configured. Deployments are
//! expected to override them through the config file or environment.

/// Auth0 tenant domain
pub const AUTH0_DOMAIN: &str = "coffee-shop.us.auth0.com";

/// API identifier that tokens must be issued for
pub const AUTH0_AUDIENCE: &str = "coffeeshop";

/// Issuer URL as it appears in the `iss` claim
pub const AUTH0_ISSUER: &str = "https://coffee-shop.us.auth0.com/";

/// Environment variable overriding [`AUTH0_DOMAIN`]
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";

/// Environment variable overriding [`AUTH0_AUDIENCE`]
pub const AUTH0_AUDIENCE_ENV: &str = "API_AUDIENCE";

/// Auth0 domain, taken from `AUTH0_DOMAIN` when set
pub fn auth0_domain() -> String {
    std::env::var(AUTH0_DOMAIN_ENV).unwrap_or_else(|_| AUTH0_DOMAIN.to_string())
}

/// Expected audience, taken from `API_AUDIENCE` when set
pub fn auth0_audience() -> String {
    std::env::var(AUTH0_AUDIENCE_ENV).unwrap_or_else(|_| AUTH0_AUDIENCE.to_string())
}

/// Issuer derived from the effective domain
pub fn auth0_issuer() -> String {
    match std::env::var(AUTH0_DOMAIN_ENV) {
        Ok(domain) => issuer_for_domain(&domain),
        Err(_) => AUTH0_ISSUER.to_string(),
    }
}

/// Auth0 issues tokens with `iss` set to the tenant URL with a trailing slash
pub fn issuer_for_domain(domain: &str) -> String {
    let host = domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{host}/")
}
