//! Liveness endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{error::Result, server::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Reports healthy once the store answers a query
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>> {
    state.store.get(0).await?;

    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
    }))
}
