//! Category repository
//!
//! Database operations for categories.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Update a category
    async fn update(&self, category: &Category) -> Result<Category>;

    /// Soft-delete a category
    async fn delete(&self, id: i64) -> Result<()>;

    /// List categories with pagination
    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<Category>, i64)>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_category_sqlite(self.pool.as_sqlite().unwrap(), category).await
            }
            DatabaseDriver::Mysql => {
                create_category_mysql(self.pool.as_mysql().unwrap(), category).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_category_by_name_sqlite(self.pool.as_sqlite().unwrap(), name).await
            }
            DatabaseDriver::Mysql => {
                get_category_by_name_mysql(self.pool.as_mysql().unwrap(), name).await
            }
        }
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_category_sqlite(self.pool.as_sqlite().unwrap(), category).await
            }
            DatabaseDriver::Mysql => {
                update_category_mysql(self.pool.as_mysql().unwrap(), category).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_category_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<Category>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_categories_sqlite(self.pool.as_sqlite().unwrap(), page, per_page).await
            }
            DatabaseDriver::Mysql => {
                list_categories_mysql(self.pool.as_mysql().unwrap(), page, per_page).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(&category.name)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create category")?;

    let id = result.last_insert_rowid();

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to read back created category")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_category_sqlite(&row))
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|r| row_to_category_sqlite(&r)))
}

async fn get_category_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE name = ? AND deleted = FALSE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by name")?;

    Ok(row.map(|r| row_to_category_sqlite(&r)))
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&category.name)
        .bind(now)
        .bind(category.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update category")?;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(category.id)
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to read back updated category")?
    .ok_or_else(|| anyhow::anyhow!("Category not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_category_sqlite(&row))
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE categories SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete category")?;

    Ok(())
}

async fn list_categories_sqlite(
    pool: &SqlitePool,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Category>, i64)> {
    let offset = (page - 1) * per_page;

    let rows = sqlx::query(
        r#"
        SELECT id, name, created_at, updated_at
        FROM categories
        WHERE deleted = FALSE
        ORDER BY name
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    let categories = rows.iter().map(row_to_category_sqlite).collect();

    let count_row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE deleted = FALSE")
        .fetch_one(pool)
        .await
        .context("Failed to count categories")?;
    let total: i64 = count_row.get("count");

    Ok((categories, total))
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(&category.name)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create category")?;

    let id = result.last_insert_id() as i64;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to read back created category")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_category_mysql(&row))
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|r| row_to_category_mysql(&r)))
}

async fn get_category_by_name_mysql(pool: &MySqlPool, name: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE name = ? AND deleted = FALSE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by name")?;

    Ok(row.map(|r| row_to_category_mysql(&r)))
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&category.name)
        .bind(now)
        .bind(category.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update category")?;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM categories WHERE id = ? AND deleted = FALSE",
    )
    .bind(category.id)
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to read back updated category")?
    .ok_or_else(|| anyhow::anyhow!("Category not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_category_mysql(&row))
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE categories SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete category")?;

    Ok(())
}

async fn list_categories_mysql(
    pool: &MySqlPool,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Category>, i64)> {
    let offset = (page - 1) * per_page;

    let rows = sqlx::query(
        r#"
        SELECT id, name, created_at, updated_at
        FROM categories
        WHERE deleted = FALSE
        ORDER BY name
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    let categories = rows.iter().map(row_to_category_mysql).collect();

    let count_row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE deleted = FALSE")
        .fetch_one(pool)
        .await
        .context("Failed to count categories")?;
    let total: i64 = count_row.get("count");

    Ok((categories, total))
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
