//! Drink persistence
//!
//! Handlers talk to a [`DrinkRepository`]; the server wires in the SQLite
//! implementation.

mod sqlite;

pub use sqlite::SqliteDrinkStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Drink, DrinkDraft, DrinkPatch};

/// Errors surfaced by a drink repository
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("drink {id} not found")]
    NotFound { id: i64 },

    #[error("a drink titled '{title}' already exists")]
    DuplicateTitle { title: String },

    #[error("invalid drink: {reason}")]
    InvalidDrink { reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// CRUD operations over drinks. Every mutation is atomic.
#[async_trait]
pub trait DrinkRepository: Send + Sync {
    /// All drinks ordered by id
    async fn list(&self) -> StoreResult<Vec<Drink>>;

    async fn get(&self, id: i64) -> StoreResult<Option<Drink>>;

    /// Insert a drink; a taken title yields [`StoreError::DuplicateTitle`]
    async fn create(&self, draft: DrinkDraft) -> StoreResult<Drink>;

    /// Apply a partial update; an unknown id yields [`StoreError::NotFound`]
    async fn update(&self, id: i64, patch: &DrinkPatch) -> StoreResult<Drink>;

    /// Remove a drink; an unknown id yields [`StoreError::NotFound`]
    async fn delete(&self, id: i64) -> StoreResult<()>;
}
