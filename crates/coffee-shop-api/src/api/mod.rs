//! HTTP surface of the coffee shop API

pub mod auth;
pub mod middleware;
pub mod routes;

use crate::server::AppState;
use auth::permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use middleware::require;

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route(
            "/drinks",
            get(routes::drinks::list_drinks).merge(require(
                &state,
                POST_DRINKS,
                post(routes::drinks::create_drink),
            )),
        )
        .route(
            "/drinks-detail",
            require(
                &state,
                GET_DRINKS_DETAIL,
                get(routes::drinks::list_drinks_detail),
            ),
        )
        .route(
            "/drinks/:id",
            require(&state, PATCH_DRINKS, patch(routes::drinks::update_drink)).merge(require(
                &state,
                DELETE_DRINKS,
                delete(routes::drinks::delete_drink),
            )),
        )
        .route("/health", get(routes::health::health_check));

    middleware::apply_middleware(router, &state)
}
