//! Authentication and authorization for the coffee shop API
//!
//! Bearer tokens are Auth0-issued RS256 JWTs. [`TokenValidator`] checks the
//! signature against the tenant's JWKS and the standard claims, then
//! [`check_permission`] enforces the scope a route requires.

pub mod jwt_validator;
pub mod permissions;

use axum::http::StatusCode;
use thiserror::Error;

pub use jwt_validator::{extract_bearer_token, Claims, Jwk, JwkSet, TokenValidator};
pub use permissions::check_permission;

/// Failures of token validation and permission checks
///
/// The display text of each variant is the message returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed authorization header")]
    MissingHeader,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid key")]
    InvalidKey,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid claims")]
    InvalidClaims,

    #[error("permissions not included in token")]
    PermissionsMissing,

    #[error("permission not found")]
    PermissionNotFound,

    #[error("signing keys unavailable")]
    KeysUnavailable,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidKey
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::MalformedToken | AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionNotFound => StatusCode::FORBIDDEN,
            AuthError::KeysUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
