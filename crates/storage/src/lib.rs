use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::info;

use shared::domain::{FoodId, FoodItem};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// Column values for an insert or a full-row update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFood {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub available: bool,
}

const FOOD_COLUMNS: &str = "id, name, description, price, image, available";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let max_connections = if is_in_memory(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_foods(&self) -> Result<Vec<FoodItem>> {
        let rows = sqlx::query(&format!("SELECT {FOOD_COLUMNS} FROM foods ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list foods")?;
        Ok(rows.iter().map(food_from_row).collect())
    }

    pub async fn get_food(&self, food_id: FoodId) -> Result<Option<FoodItem>> {
        let row = sqlx::query(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = ?"))
            .bind(food_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load food {food_id}"))?;
        Ok(row.as_ref().map(food_from_row))
    }

    pub async fn insert_food(&self, food: &NewFood) -> Result<FoodItem> {
        let row = sqlx::query(&format!(
            "INSERT INTO foods (name, description, price, image, available)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(&food.name)
        .bind(&food.description)
        .bind(food.price)
        .bind(&food.image)
        .bind(food.available)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert food")?;
        Ok(food_from_row(&row))
    }

    /// Overwrites every column of an existing row. Returns `None` when no row
    /// has `food_id`.
    pub async fn update_food(&self, food_id: FoodId, food: &NewFood) -> Result<Option<FoodItem>> {
        let row = sqlx::query(&format!(
            "UPDATE foods
             SET name = ?, description = ?, price = ?, image = ?, available = ?
             WHERE id = ?
             RETURNING {FOOD_COLUMNS}"
        ))
        .bind(&food.name)
        .bind(&food.description)
        .bind(food.price)
        .bind(&food.image)
        .bind(food.available)
        .bind(food_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update food {food_id}"))?;
        Ok(row.as_ref().map(food_from_row))
    }

    /// Returns whether a row was removed.
    pub async fn delete_food(&self, food_id: FoodId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM foods WHERE id = ?")
            .bind(food_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete food {food_id}"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_foods(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM foods")
            .fetch_one(&self.pool)
            .await
            .context("failed to count foods")?;
        Ok(count)
    }

    /// Inserts [`default_menu`] when the table is empty. Returns the number of
    /// rows inserted.
    pub async fn seed_default_menu_if_empty(&self) -> Result<usize> {
        if self.count_foods().await? > 0 {
            return Ok(0);
        }
        let menu = default_menu();
        let mut tx = self.pool.begin().await?;
        for food in &menu {
            sqlx::query(
                "INSERT INTO foods (name, description, price, image, available)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&food.name)
            .bind(&food.description)
            .bind(food.price)
            .bind(&food.image)
            .bind(food.available)
            .execute(&mut *tx)
            .await
            .context("failed to seed default menu")?;
        }
        tx.commit().await?;
        info!(inserted = menu.len(), "seeded default menu");
        Ok(menu.len())
    }
}

pub fn default_menu() -> Vec<NewFood> {
    vec![
        NewFood {
            name: "Ao molho".into(),
            description: "Macarrão ao molho branco, fughi e cheiro verde das montanhas.".into(),
            price: 19.9,
            image: "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-food/food1.png".into(),
            available: true,
        },
        NewFood {
            name: "Veggie".into(),
            description: "Macarrão com pimentão, ervilha e ervas finas colhidas no himalaia.".into(),
            price: 21.9,
            image: "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-food/food2.png".into(),
            available: true,
        },
        NewFood {
            name: "A la Camarón".into(),
            description: "Macarrão com vegetais de primeira linha e camarão dos 7 mares.".into(),
            price: 25.9,
            image: "https://storage.googleapis.com/golden-wind/bootcamp-gostack/desafio-food/food3.png".into(),
            available: true,
        },
    ]
}

fn food_from_row(row: &SqliteRow) -> FoodItem {
    FoodItem {
        id: FoodId(row.get::<i64, _>(0)),
        name: row.get::<String, _>(1),
        description: row.get::<String, _>(2),
        price: row.get::<f64, _>(3),
        image: row.get::<String, _>(4),
        available: row.get::<bool, _>(5),
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
