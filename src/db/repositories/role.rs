//! Role repository
//!
//! Database operations for roles. The migrations seed the two built-in
//! roles (`admin`, `user`); administrators may add more through the API.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Role;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Role repository trait
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Create a new role
    async fn create(&self, role: &Role) -> Result<Role>;

    /// Get role by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Role>>;

    /// Get role by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Update a role
    async fn update(&self, role: &Role) -> Result<Role>;

    /// Soft-delete a role
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all roles
    async fn list(&self) -> Result<Vec<Role>>;
}

/// SQLx-based role repository implementation
pub struct SqlxRoleRepository {
    pool: DynDatabasePool,
}

impl SqlxRoleRepository {
    /// Create a new SQLx role repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RoleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RoleRepository for SqlxRoleRepository {
    async fn create(&self, role: &Role) -> Result<Role> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_role_sqlite(self.pool.as_sqlite().unwrap(), role).await,
            DatabaseDriver::Mysql => create_role_mysql(self.pool.as_mysql().unwrap(), role).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Role>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_role_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_role_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Role>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_role_by_name_sqlite(self.pool.as_sqlite().unwrap(), name).await
            }
            DatabaseDriver::Mysql => {
                get_role_by_name_mysql(self.pool.as_mysql().unwrap(), name).await
            }
        }
    }

    async fn update(&self, role: &Role) -> Result<Role> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_role_sqlite(self.pool.as_sqlite().unwrap(), role).await,
            DatabaseDriver::Mysql => update_role_mysql(self.pool.as_mysql().unwrap(), role).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_role_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_role_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Role>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_roles_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_roles_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_role_sqlite(pool: &SqlitePool, role: &Role) -> Result<Role> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "INSERT INTO roles (name, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(&role.name)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create role")?;

    let id = result.last_insert_rowid();

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to read back created role")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_role_sqlite(&row))
}

async fn get_role_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Role>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get role by ID")?;

    Ok(row.map(|r| row_to_role_sqlite(&r)))
}

async fn get_role_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<Option<Role>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE name = ? AND deleted = FALSE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get role by name")?;

    Ok(row.map(|r| row_to_role_sqlite(&r)))
}

async fn update_role_sqlite(pool: &SqlitePool, role: &Role) -> Result<Role> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE roles SET name = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&role.name)
        .bind(now)
        .bind(role.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update role")?;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(role.id)
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to read back updated role")?
    .ok_or_else(|| anyhow::anyhow!("Role not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_role_sqlite(&row))
}

async fn delete_role_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query("UPDATE roles SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete role")?;

    Ok(())
}

async fn list_roles_sqlite(pool: &SqlitePool) -> Result<Vec<Role>> {
    let rows = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE deleted = FALSE ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list roles")?;

    Ok(rows.iter().map(row_to_role_sqlite).collect())
}

fn row_to_role_sqlite(row: &sqlx::sqlite::SqliteRow) -> Role {
    Role {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_role_mysql(pool: &MySqlPool, role: &Role) -> Result<Role> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        "INSERT INTO roles (name, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(&role.name)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create role")?;

    let id = result.last_insert_id() as i64;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .context("Failed to read back created role")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_role_mysql(&row))
}

async fn get_role_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Role>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get role by ID")?;

    Ok(row.map(|r| row_to_role_mysql(&r)))
}

async fn get_role_by_name_mysql(pool: &MySqlPool, name: &str) -> Result<Option<Role>> {
    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE name = ? AND deleted = FALSE",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get role by name")?;

    Ok(row.map(|r| row_to_role_mysql(&r)))
}

async fn update_role_mysql(pool: &MySqlPool, role: &Role) -> Result<Role> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE roles SET name = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&role.name)
        .bind(now)
        .bind(role.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update role")?;

    let row = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ? AND deleted = FALSE",
    )
    .bind(role.id)
    .fetch_optional(&mut *tx)
    .await
    .context("Failed to read back updated role")?
    .ok_or_else(|| anyhow::anyhow!("Role not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_role_mysql(&row))
}

async fn delete_role_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query("UPDATE roles SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete role")?;

    Ok(())
}

async fn list_roles_mysql(pool: &MySqlPool) -> Result<Vec<Role>> {
    let rows = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM roles WHERE deleted = FALSE ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list roles")?;

    Ok(rows.iter().map(row_to_role_mysql).collect())
}

fn row_to_role_mysql(row: &sqlx::mysql::MySqlRow) -> Role {
    Role {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{ROLE_ADMIN, ROLE_USER};

    async fn setup_test_repo() -> SqlxRoleRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxRoleRepository::new(pool)
    }

    #[tokio::test]
    async fn test_seeded_roles_present() {
        let repo = setup_test_repo().await;

        let roles = repo.list().await.expect("Failed to list roles");
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();

        assert!(names.contains(&ROLE_ADMIN));
        assert!(names.contains(&ROLE_USER));
    }

    #[tokio::test]
    async fn test_create_role() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&Role::new("moderator".to_string()))
            .await
            .expect("Failed to create role");

        assert!(created.id > 0);
        assert_eq!(created.name, "moderator");
    }

    #[tokio::test]
    async fn test_get_role_by_name() {
        let repo = setup_test_repo().await;

        let found = repo
            .get_by_name(ROLE_ADMIN)
            .await
            .expect("Failed to get role")
            .expect("Role not found");

        assert_eq!(found.name, ROLE_ADMIN);
    }

    #[tokio::test]
    async fn test_duplicate_role_name_rejected() {
        let repo = setup_test_repo().await;

        let result = repo.create(&Role::new(ROLE_ADMIN.to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_role() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&Role::new("moderator".to_string()))
            .await
            .expect("Failed to create role");

        let mut role = created.clone();
        role.name = "supervisor".to_string();

        let updated = repo.update(&role).await.expect("Failed to update role");
        assert_eq!(updated.name, "supervisor");
    }

    #[tokio::test]
    async fn test_delete_role_is_soft() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&Role::new("temporary".to_string()))
            .await
            .expect("Failed to create role");

        repo.delete(created.id).await.expect("Failed to delete role");

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(repo.get_by_name("temporary").await.unwrap().is_none());

        let roles = repo.list().await.expect("Failed to list roles");
        assert!(!roles.iter().any(|r| r.name == "temporary"));
    }
}
