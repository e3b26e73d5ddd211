//! Main server implementation for the coffee shop API

use crate::{
    api,
    api::auth::TokenValidator,
    config::Config,
    error::{ApiError, Result},
    store::{DrinkRepository, SqliteDrinkStore},
};
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Drink persistence
    pub store: Arc<dyn DrinkRepository>,

    /// Bearer token validator with its JWKS cache
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    /// Assemble state from already-built collaborators
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn DrinkRepository>,
        validator: Arc<TokenValidator>,
    ) -> Self {
        Self {
            config,
            store,
            validator,
        }
    }

    /// Open the configured database and build the token validator
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = SqliteDrinkStore::connect(&config.database).await?;
        let validator = TokenValidator::new(&config.auth).map_err(|e| ApiError::Internal {
            message: format!("Failed to create token validator: {e}"),
        })?;

        info!(
            "Validating tokens for audience {} issued by {}",
            config.auth.audience,
            config.auth.issuer()
        );

        Ok(Self::new(
            Arc::new(config),
            Arc::new(store),
            Arc::new(validator),
        ))
    }
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing coffee shop API server");

        let state = AppState::from_config(config).await?;
        Ok(Self::with_state(state))
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let app = Self::build_router(state);
        Self { config, app }
    }

    /// Build the application router with all routes and middleware
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .merge(api::routes(state.clone()))
            .with_state(state)
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("Coffee shop API listening on {}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
