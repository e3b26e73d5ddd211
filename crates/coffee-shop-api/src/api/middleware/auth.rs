//! Bearer token guard for protected routes

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::{debug, warn};

use crate::{
    api::auth::{check_permission, extract_bearer_token, AuthError, Claims},
    error::ApiError,
    server::AppState,
};

/// Validate the bearer token and require `permission` before running the handler
///
/// On success the validated [`Claims`] are stored in the request extensions.
pub async fn require_permission(
    state: AppState,
    permission: &'static str,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, req.headers()).await.map_err(|e| {
        warn!("Authentication failed for {} {}: {}", req.method(), req.uri().path(), e);
        e
    })?;

    check_permission(permission, &claims).map_err(|e| {
        warn!("Subject {} denied {}: {}", claims.sub, permission, e);
        e
    })?;

    debug!("Subject {} authorized for {}", claims.sub, permission);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// Only the headers may be held across the await; `Body` is not `Sync`.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers)?;
    state.validator.validate(token).await
}

/// Wrap a method router so it only runs for callers holding `permission`
pub fn require(
    state: &AppState,
    permission: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        state.clone(),
        move |State(state): State<AppState>, req: Request, next: Next| {
            require_permission(state, permission, req, next)
        },
    ))
}
