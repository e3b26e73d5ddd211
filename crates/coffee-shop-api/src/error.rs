//! Error types for the coffee shop API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::api::auth::AuthError;
use crate::store::StoreError;

/// Main error type for the coffee shop API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] coffee_shop_common::ConfigurationError),

    /// Token validation or permission failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Request conflicts with existing state
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Request body could not be turned into a valid operation
    #[error("Unprocessable request: {message}")]
    Unprocessable { message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => e.status_code(),
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Config(_) | ApiError::Database(_) | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the response envelope. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Auth(e) => e.to_string(),
            ApiError::NotFound { .. } => "resource not found".to_string(),
            ApiError::Conflict { .. } => "request conflict".to_string(),
            ApiError::Unprocessable { .. } => "unprocessable".to_string(),
            ApiError::Config(_) | ApiError::Database(_) | ApiError::Internal { .. } => {
                "internal server error".to_string()
            }
        }
    }

    /// Check if error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => ApiError::NotFound {
                resource: format!("drink {id}"),
            },
            StoreError::DuplicateTitle { title } => ApiError::Conflict {
                message: format!("a drink titled '{title}' already exists"),
            },
            StoreError::InvalidDrink { reason } => ApiError::Unprocessable { message: reason },
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            success: false,
            error: status.as_u16(),
            message: self.public_message(),
        });

        (status, body).into_response()
    }
}

/// Uniform error envelope returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// HTTP status code, repeated in the body
    pub error: u16,

    /// Human-readable error message
    pub message: String,
}
