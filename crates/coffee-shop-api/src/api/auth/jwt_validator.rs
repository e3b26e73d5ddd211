//! JWT validation against an Auth0 JSON Web Key Set
//!
//! The validator fetches the tenant's JWKS, keeps it in a TTL cache and
//! verifies RS256 bearer tokens: signature, issuer, audience and expiry.
//! A token whose `kid` is missing from the cached set triggers one refresh,
//! so rotated keys are picked up without waiting for the TTL. Forced refreshes
//! are throttled to one per `jwks_min_refresh_interval`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{
    decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation,
};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::AuthError;
use crate::config::AuthConfig;

/// JSON Web Key Set structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    pub r#use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl Jwk {
    fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        if self.kty != "RSA" {
            warn!("Unsupported key type in JWKS: {}", self.kty);
            return Err(AuthError::InvalidKey);
        }
        let (Some(n), Some(e)) = (self.n.as_deref(), self.e.as_deref()) else {
            warn!("RSA key {:?} is missing its modulus or exponent", self.kid);
            return Err(AuthError::InvalidKey);
        };
        DecodingKey::from_rsa_components(n, e).map_err(|e| {
            warn!("Failed to build RSA key {:?}: {}", self.kid, e);
            AuthError::InvalidKey
        })
    }
}

/// Claims of a validated access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    #[serde(default)]
    pub sub: String,
    /// Audience, a single string or an array
    pub aud: Value,
    /// Issuer
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// RBAC permissions granted to the subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// Any other claims
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MissingHeader),
    }
}

/// Verifies bearer tokens issued by the configured Auth0 tenant
pub struct TokenValidator {
    jwks_url: String,
    audience: String,
    issuer: String,
    leeway: Duration,
    min_refresh_interval: Duration,
    http: reqwest::Client,
    cache: Cache<String, Arc<JwkSet>>,
    last_forced_refresh: Mutex<Option<Instant>>,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.jwks_fetch_timeout())
            .connect_timeout(config.jwks_fetch_timeout())
            .user_agent(concat!("coffee-shop-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .time_to_live(config.jwks_cache_ttl())
            .max_capacity(4)
            .build();

        Ok(Self {
            jwks_url: config.jwks_url(),
            audience: config.audience.clone(),
            issuer: config.issuer(),
            leeway: config.allowed_clock_skew(),
            min_refresh_interval: config.jwks_min_refresh_interval(),
            http,
            cache,
            last_forced_refresh: Mutex::new(None),
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Current key set, served from cache when fresh
    #[instrument(level = "debug", skip(self))]
    pub async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.cache
            .try_get_with(self.jwks_url.clone(), self.fetch_jwks())
            .await
            .map_err(|e| {
                warn!("Failed to fetch JWKS from {}: {}", self.jwks_url, e);
                AuthError::KeysUnavailable
            })
    }

    async fn fetch_jwks(&self) -> anyhow::Result<Arc<JwkSet>> {
        debug!("Fetching JWKS from: {}", self.jwks_url);

        let response = self.http.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("JWKS endpoint returned {}", response.status());
        }

        let jwks: JwkSet = response.json().await?;
        if jwks.keys.is_empty() {
            anyhow::bail!("JWKS contains no keys");
        }

        debug!("Fetched JWKS with {} keys", jwks.keys.len());
        Ok(Arc::new(jwks))
    }

    /// Refetch the key set and replace the cached one
    ///
    /// Returns `None` when a forced refresh already ran within the minimum
    /// interval. The cached set stays in place for concurrent lookups.
    async fn force_refresh(&self) -> Result<Option<Arc<JwkSet>>, AuthError> {
        let mut last = self.last_forced_refresh.lock().await;
        if last.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            return Ok(None);
        }
        *last = Some(Instant::now());

        let jwks = self.fetch_jwks().await.map_err(|e| {
            warn!("Failed to refresh JWKS from {}: {}", self.jwks_url, e);
            AuthError::KeysUnavailable
        })?;
        self.cache.insert(self.jwks_url.clone(), jwks.clone()).await;
        Ok(Some(jwks))
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwks = self.key_set().await?;
        if let Some(jwk) = jwks.find(kid) {
            return jwk.decoding_key();
        }

        debug!("Key {} not in cached JWKS, refreshing", kid);
        let Some(jwks) = self.force_refresh().await? else {
            warn!("Unknown key ID {} and JWKS refreshed recently", kid);
            return Err(AuthError::InvalidKey);
        };

        match jwks.find(kid) {
            Some(jwk) => jwk.decoding_key(),
            None => {
                warn!("No matching key found for key ID: {}", kid);
                Err(AuthError::InvalidKey)
            }
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.leeway.as_secs();
        validation
    }

    /// Validate a raw bearer token and return its claims
    #[instrument(level = "debug", skip(self, token))]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Failed to decode JWT header: {}", e);
            AuthError::MalformedToken
        })?;

        let kid = header.kid.ok_or_else(|| {
            debug!("JWT header missing key ID (kid)");
            AuthError::InvalidKey
        })?;

        let decoding_key = self.decoding_key(&kid).await?;

        let token_data =
            decode::<Claims>(token, &decoding_key, &self.validation()).map_err(|e| {
                debug!("JWT validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidAudience
                    | ErrorKind::InvalidIssuer
                    | ErrorKind::ImmatureSignature
                    | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
                    _ => AuthError::MalformedToken,
                }
            })?;

        debug!(
            "JWT validation successful for subject: {}",
            token_data.claims.sub
        );
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SIGNING_KEY: &[u8] = include_bytes!("../../../tests/fixtures/signing_key.pem");
    const FOREIGN_KEY: &[u8] = include_bytes!("../../../tests/fixtures/foreign_key.pem");
    const JWKS: &str = include_str!("../../../tests/fixtures/jwks.json");
    const KID: &str = "test-key-1";
    const AUDIENCE: &str = "coffeeshop";
    const ISSUER: &str = "https://coffee-shop.test/";

    fn sign(claims: Value, kid: Option<&str>, key: &[u8]) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(String::from);
        encode(&header, &claims, &EncodingKey::from_rsa_pem(key).unwrap()).unwrap()
    }

    fn claims(permissions: &[&str]) -> Value {
        json!({
            "sub": "auth0|barista",
            "aud": AUDIENCE,
            "iss": ISSUER,
            "iat": get_current_timestamp(),
            "exp": get_current_timestamp() + 3600,
            "permissions": permissions,
        })
    }

    async fn jwks_server(expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(JWKS, "application/json"),
            )
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    fn validator(server: &MockServer) -> TokenValidator {
        let config = AuthConfig {
            domain: "coffee-shop.test".to_string(),
            audience: AUDIENCE.to_string(),
            issuer: ISSUER.to_string(),
            jwks_url: Some(format!("{}/.well-known/jwks.json", server.uri())),
            ..AuthConfig::default()
        };
        TokenValidator::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_yields_permissions() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let token = sign(claims(&["get:drinks-detail"]), Some(KID), SIGNING_KEY);
        let claims = validator.validate(&token).await.unwrap();

        assert_eq!(claims.sub, "auth0|barista");
        assert_eq!(claims.permissions, Some(vec!["get:drinks-detail".to_string()]));
    }

    #[tokio::test]
    async fn test_jwks_is_cached_between_requests() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let token = sign(claims(&[]), Some(KID), SIGNING_KEY);
        validator.validate(&token).await.unwrap();
        validator.validate(&token).await.unwrap();
        validator.validate(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_audience_array_is_accepted() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let mut body = claims(&[]);
        body["aud"] = json!(["https://coffee-shop.test/userinfo", AUDIENCE]);
        let token = sign(body, Some(KID), SIGNING_KEY);
        assert!(validator.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let mut body = claims(&[]);
        body["exp"] = json!(get_current_timestamp() - 3600);
        let token = sign(body, Some(KID), SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn test_wrong_audience_is_invalid_claims() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let mut body = claims(&[]);
        body["aud"] = json!("someone-else");
        let token = sign(body, Some(KID), SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidClaims
        );
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_invalid_claims() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let mut body = claims(&[]);
        body["iss"] = json!("https://evil.example/");
        let token = sign(body, Some(KID), SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidClaims
        );
    }

    #[tokio::test]
    async fn test_unknown_kid_refreshes_once_then_fails() {
        let server = jwks_server(2).await;
        let validator = validator(&server);

        let token = sign(claims(&[]), Some("rotated-away"), SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidKey
        );
    }

    #[tokio::test]
    async fn test_unknown_kids_do_not_refetch_within_interval() {
        let server = jwks_server(2).await;
        let validator = validator(&server);

        for i in 0..10 {
            let token = sign(claims(&[]), Some(&format!("bogus-{i}")), SIGNING_KEY);
            assert_eq!(
                validator.validate(&token).await.unwrap_err(),
                AuthError::InvalidKey
            );
        }

        let token = sign(claims(&["get:drinks-detail"]), Some(KID), SIGNING_KEY);
        assert!(validator.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotated_key_is_found_after_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    JWKS.replace(KID, "retired-key"),
                    "application/json",
                ),
            )
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
            .expect(1)
            .mount(&server)
            .await;
        let validator = validator(&server);

        let token = sign(claims(&[]), Some(KID), SIGNING_KEY);
        assert!(validator.validate(&token).await.is_ok());
        assert!(validator.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_kid_is_invalid_key() {
        let server = jwks_server(0).await;
        let validator = validator(&server);

        let token = sign(claims(&[]), None, SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::InvalidKey
        );
    }

    #[tokio::test]
    async fn test_foreign_signature_is_malformed() {
        let server = jwks_server(1).await;
        let validator = validator(&server);

        let token = sign(claims(&[]), Some(KID), FOREIGN_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let server = jwks_server(0).await;
        let validator = validator(&server);

        assert_eq!(
            validator.validate("not-a-jwt").await.unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[tokio::test]
    async fn test_jwks_outage_is_keys_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let validator = validator(&server);

        let token = sign(claims(&[]), Some(KID), SIGNING_KEY);
        assert_eq!(
            validator.validate(&token).await.unwrap_err(),
            AuthError::KeysUnavailable
        );
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), Err(AuthError::MissingHeader));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Ok("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Ok("abc.def.ghi"));

        for malformed in ["Bearer", "Basic dXNlcjpwYXNz", "Bearer a b", "abc.def.ghi", ""] {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(malformed));
            assert_eq!(
                extract_bearer_token(&headers),
                Err(AuthError::MissingHeader),
                "header {malformed:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_rsa_key_is_rejected() {
        let jwk = Jwk {
            kty: "oct".to_string(),
            kid: Some(KID.to_string()),
            alg: None,
            r#use: None,
            n: None,
            e: None,
            other: HashMap::new(),
        };
        assert!(matches!(jwk.decoding_key(), Err(AuthError::InvalidKey)));
    }
}
