//! Drink route handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    api::auth::Claims,
    error::{ApiError, Result},
    models::{Drink, DrinkPatch, DrinkShort, NewDrink},
    server::AppState,
};

/// `{"success": true, "drinks": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: T,
}

impl<T> DrinksResponse<T> {
    fn ok(drinks: T) -> Json<Self> {
        Json(Self {
            success: true,
            drinks,
        })
    }
}

/// `{"success": true, "delete": <id>}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::Unprocessable {
            message: e.body_text(),
        })
}

fn drink_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    path.map(|Path(id)| id).map_err(|e| ApiError::NotFound {
        resource: e.body_text(),
    })
}

async fn all_drinks(state: &AppState) -> Result<Vec<Drink>> {
    let drinks = state.store.list().await?;
    // An empty menu is reported as 404, matching existing clients.
    if drinks.is_empty() {
        return Err(ApiError::NotFound {
            resource: "drinks".to_string(),
        });
    }
    Ok(drinks)
}

/// `GET /drinks`: public menu in short form
#[instrument(skip(state))]
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<DrinkShort>>>> {
    let drinks = all_drinks(&state).await?;
    debug!("Listing {} drinks", drinks.len());
    Ok(DrinksResponse::ok(drinks.iter().map(Drink::short).collect()))
}

/// `GET /drinks-detail`: full recipes, requires `get:drinks-detail`
#[instrument(skip(state))]
pub async fn list_drinks_detail(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<Drink>>>> {
    let drinks = all_drinks(&state).await?;
    debug!("Listing {} drinks in detail", drinks.len());
    Ok(DrinksResponse::ok(drinks))
}

/// `POST /drinks`: requires `post:drinks`
#[instrument(skip(state, claims, payload), fields(sub = %claims.sub))]
pub async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: std::result::Result<Json<NewDrink>, JsonRejection>,
) -> Result<Json<DrinksResponse<Drink>>> {
    let draft = body(payload)?
        .into_draft()
        .map_err(|message| ApiError::Unprocessable { message })?;

    let drink = state.store.create(draft).await?;
    info!("Created drink {} ({})", drink.id, drink.title);

    Ok(DrinksResponse::ok(drink))
}

/// `PATCH /drinks/{id}`: requires `patch:drinks`
#[instrument(skip(state, claims, path, payload), fields(sub = %claims.sub))]
pub async fn update_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<DrinkPatch>, JsonRejection>,
) -> Result<Json<DrinksResponse<Vec<Drink>>>> {
    let id = drink_id(path)?;
    let patch = body(payload)?;

    let drink = state.store.update(id, &patch).await?;
    info!("Updated drink {} ({})", drink.id, drink.title);

    Ok(DrinksResponse::ok(vec![drink]))
}

/// `DELETE /drinks/{id}`: requires `delete:drinks`
#[instrument(skip(state, claims, path), fields(sub = %claims.sub))]
pub async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    let id = drink_id(path)?;

    state.store.delete(id).await?;
    info!("Deleted drink {}", id);

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
