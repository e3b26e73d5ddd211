use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{DrinkRepository, StoreError, StoreResult};
use crate::config::DatabaseConfig;
use crate::models::{Drink, DrinkDraft, DrinkPatch, Ingredient};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS drink_ingredients (
        drink_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        color TEXT NOT NULL,
        name TEXT NOT NULL,
        parts INTEGER NOT NULL,
        PRIMARY KEY (drink_id, position),
        FOREIGN KEY (drink_id) REFERENCES drinks (id) ON DELETE CASCADE
    );
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed drink repository
#[derive(Debug, Clone)]
pub struct SqliteDrinkStore {
    pool: SqlitePool,
}

impl SqliteDrinkStore {
    /// Open (creating if needed) the configured database and ensure the schema
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = if is_memory_url(&config.url) {
            // Every connection to :memory: is a separate database.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.run_migrations().await?;

        info!("Drink store ready at {}", config.url);
        Ok(store)
    }

    /// Fresh in-memory store
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop every table, recreate the schema and seed a sample drink
    pub async fn reset(&self) -> StoreResult<Drink> {
        sqlx::query("DROP TABLE IF EXISTS drink_ingredients; DROP TABLE IF EXISTS drinks;")
            .execute(&self.pool)
            .await?;
        self.run_migrations().await?;

        info!("Drink store reset");

        self.create(DrinkDraft {
            title: "water".to_string(),
            recipe: vec![Ingredient {
                color: "blue".to_string(),
                name: "water".to_string(),
                parts: 1,
            }],
        })
        .await
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn map_write_error(err: sqlx::Error, title: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateTitle {
            title: title.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

async fn fetch_recipe(conn: &mut SqliteConnection, drink_id: i64) -> StoreResult<Vec<Ingredient>> {
    let rows = sqlx::query(
        "SELECT color, name, parts FROM drink_ingredients WHERE drink_id = ? ORDER BY position",
    )
    .bind(drink_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_ingredient).collect()
}

async fn fetch_drink(conn: &mut SqliteConnection, id: i64) -> StoreResult<Option<Drink>> {
    let row = sqlx::query("SELECT id, title FROM drinks WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let recipe = fetch_recipe(conn, id).await?;
    Ok(Some(Drink {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        recipe,
    }))
}

async fn insert_recipe(
    conn: &mut SqliteConnection,
    drink_id: i64,
    recipe: &[Ingredient],
) -> StoreResult<()> {
    for (position, ingredient) in recipe.iter().enumerate() {
        sqlx::query(
            "INSERT INTO drink_ingredients (drink_id, position, color, name, parts)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(drink_id)
        .bind(position as i64)
        .bind(&ingredient.color)
        .bind(&ingredient.name)
        .bind(ingredient.parts)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn row_to_ingredient(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Ingredient> {
    Ok(Ingredient {
        color: row.try_get("color")?,
        name: row.try_get("name")?,
        parts: row.try_get("parts")?,
    })
}

#[async_trait]
impl DrinkRepository for SqliteDrinkStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        let drink_rows = sqlx::query("SELECT id, title FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let ingredient_rows = sqlx::query(
            "SELECT drink_id, color, name, parts FROM drink_ingredients
             ORDER BY drink_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut recipes: BTreeMap<i64, Vec<Ingredient>> = BTreeMap::new();
        for row in &ingredient_rows {
            let drink_id: i64 = row.try_get("drink_id")?;
            recipes
                .entry(drink_id)
                .or_default()
                .push(row_to_ingredient(row)?);
        }

        drink_rows
            .iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                Ok(Drink {
                    id,
                    title: row.try_get("title")?,
                    recipe: recipes.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Drink>> {
        let mut conn = self.pool.acquire().await?;
        fetch_drink(&mut conn, id).await
    }

    async fn create(&self, draft: DrinkDraft) -> StoreResult<Drink> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO drinks (title) VALUES (?)")
            .bind(&draft.title)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &draft.title))?;
        let id = result.last_insert_rowid();

        insert_recipe(&mut tx, id, &draft.recipe).await?;
        tx.commit().await?;

        debug!("Inserted drink {} ({})", id, draft.title);

        Ok(Drink {
            id,
            title: draft.title,
            recipe: draft.recipe,
        })
    }

    async fn update(&self, id: i64, patch: &DrinkPatch) -> StoreResult<Drink> {
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock before it reads.
        // A deferred read-then-write can fail with SQLITE_BUSY under contention.
        let locked = sqlx::query("UPDATE drinks SET title = title WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }

        let current = fetch_drink(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound { id })?;
        let updated = patch
            .apply(&current)
            .map_err(|reason| StoreError::InvalidDrink { reason })?;

        if updated.title != current.title {
            sqlx::query("UPDATE drinks SET title = ? WHERE id = ?")
                .bind(&updated.title)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error(e, &updated.title))?;
        }

        if updated.recipe != current.recipe {
            sqlx::query("DELETE FROM drink_ingredients WHERE drink_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_recipe(&mut tx, id, &updated.recipe).await?;
        }

        tx.commit().await?;

        debug!("Updated drink {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM drink_ingredients WHERE drink_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }

        tx.commit().await?;

        debug!("Deleted drink {}", id);
        Ok(())
    }
}
