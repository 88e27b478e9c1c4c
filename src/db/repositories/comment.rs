//! Comment repository
//!
//! Database operations for comments. Comments are always listed per
//! article, newest first.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Comment;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Update a comment
    async fn update(&self, comment: &Comment) -> Result<Comment>;

    /// Soft-delete a comment
    async fn delete(&self, id: i64) -> Result<()>;

    /// List comments for an article with pagination
    async fn list_by_article(
        &self,
        article_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Comment>, i64)>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(self.pool.as_sqlite().unwrap(), comment).await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(self.pool.as_mysql().unwrap(), comment).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_comment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_comment_sqlite(self.pool.as_sqlite().unwrap(), comment).await
            }
            DatabaseDriver::Mysql => {
                update_comment_mysql(self.pool.as_mysql().unwrap(), comment).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_article(
        &self,
        article_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Comment>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_sqlite(self.pool.as_sqlite().unwrap(), article_id, page, per_page)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_comments_mysql(self.pool.as_mysql().unwrap(), article_id, page, per_page).await
            }
        }
    }
}

const SELECT_COMMENT: &str = r#"
    SELECT id, article_id, user_id, content, created_at, updated_at
    FROM comments
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO comments (article_id, user_id, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(comment.article_id)
    .bind(comment.user_id)
    .bind(&comment.content)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create comment")?;

    let id = result.last_insert_rowid();

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back created comment")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_comment_sqlite(&row))
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.map(|r| row_to_comment_sqlite(&r)))
}

async fn update_comment_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&comment.content)
        .bind(now)
        .bind(comment.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update comment")?;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(comment.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read back updated comment")?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_comment_sqlite(&row))
}

async fn delete_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE comments SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete comment")?;

    Ok(())
}

async fn list_comments_sqlite(
    pool: &SqlitePool,
    article_id: i64,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Comment>, i64)> {
    let offset = (page - 1) * per_page;

    let rows = sqlx::query(&format!(
        "{} WHERE article_id = ? AND deleted = FALSE ORDER BY created_at DESC LIMIT ? OFFSET ?",
        SELECT_COMMENT
    ))
    .bind(article_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    let comments = rows.iter().map(row_to_comment_sqlite).collect();

    let count_row = sqlx::query(
        "SELECT COUNT(*) as count FROM comments WHERE article_id = ? AND deleted = FALSE",
    )
    .bind(article_id)
    .fetch_one(pool)
    .await
    .context("Failed to count comments")?;
    let total: i64 = count_row.get("count");

    Ok((comments, total))
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO comments (article_id, user_id, content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(comment.article_id)
    .bind(comment.user_id)
    .bind(&comment.content)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create comment")?;

    let id = result.last_insert_id() as i64;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back created comment")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_comment_mysql(&row))
}

async fn get_comment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get comment by ID")?;

    Ok(row.map(|r| row_to_comment_mysql(&r)))
}

async fn update_comment_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ? AND deleted = FALSE")
        .bind(&comment.content)
        .bind(now)
        .bind(comment.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update comment")?;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_COMMENT))
        .bind(comment.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read back updated comment")?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_comment_mysql(&row))
}

async fn delete_comment_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE comments SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete comment")?;

    Ok(())
}

async fn list_comments_mysql(
    pool: &MySqlPool,
    article_id: i64,
    page: i64,
    per_page: i64,
) -> Result<(Vec<Comment>, i64)> {
    let offset = (page - 1) * per_page;

    let rows = sqlx::query(&format!(
        "{} WHERE article_id = ? AND deleted = FALSE ORDER BY created_at DESC LIMIT ? OFFSET ?",
        SELECT_COMMENT
    ))
    .bind(article_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    let comments = rows.iter().map(row_to_comment_mysql).collect();

    let count_row = sqlx::query(
        "SELECT COUNT(*) as count FROM comments WHERE article_id = ? AND deleted = FALSE",
    )
    .bind(article_id)
    .fetch_one(pool)
    .await
    .context("Failed to count comments")?;
    let total: i64 = count_row.get("count");

    Ok((comments, total))
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ArticleRepository, CategoryRepository, SqlxArticleRepository, SqlxCategoryRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Article, Category, User, ROLE_USER};

    struct TestContext {
        repo: SqlxCommentRepository,
        article_id: i64,
        user_id: i64,
    }

    async fn setup() -> TestContext {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "commenter".to_string(),
                "commenter@example.com".to_string(),
                "hash".to_string(),
                2,
                ROLE_USER.to_string(),
            ))
            .await
            .expect("Failed to create user");

        let categories = SqlxCategoryRepository::new(pool.clone());
        let category = categories
            .create(&Category::new("General".to_string()))
            .await
            .expect("Failed to create category");

        let articles = SqlxArticleRepository::new(pool.clone());
        let article = articles
            .create(&Article::new(
                "Commented".to_string(),
                "Body".to_string(),
                user.id,
                category.id,
                true,
            ))
            .await
            .expect("Failed to create article");

        TestContext {
            repo: SqlxCommentRepository::new(pool),
            article_id: article.id,
            user_id: user.id,
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let ctx = setup().await;

        let created = ctx
            .repo
            .create(&Comment::new(ctx.article_id, ctx.user_id, "First!".to_string()))
            .await
            .expect("Failed to create comment");

        assert!(created.id > 0);
        assert_eq!(created.content, "First!");
        assert_eq!(created.article_id, ctx.article_id);
    }

    #[tokio::test]
    async fn test_update_comment() {
        let ctx = setup().await;
        let created = ctx
            .repo
            .create(&Comment::new(ctx.article_id, ctx.user_id, "Typo hre".to_string()))
            .await
            .expect("Failed to create comment");

        let mut comment = created.clone();
        comment.content = "Typo here".to_string();

        let updated = ctx.repo.update(&comment).await.expect("Failed to update");
        assert_eq!(updated.content, "Typo here");
    }

    #[tokio::test]
    async fn test_delete_comment_is_soft() {
        let ctx = setup().await;
        let created = ctx
            .repo
            .create(&Comment::new(ctx.article_id, ctx.user_id, "Regretted".to_string()))
            .await
            .expect("Failed to create comment");

        ctx.repo.delete(created.id).await.expect("Failed to delete");

        assert!(ctx.repo.get_by_id(created.id).await.unwrap().is_none());

        let (comments, total) = ctx
            .repo
            .list_by_article(ctx.article_id, 1, 10)
            .await
            .expect("Failed to list");
        assert_eq!(total, 0);
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_list_comments_by_article() {
        let ctx = setup().await;
        for i in 0..3 {
            ctx.repo
                .create(&Comment::new(
                    ctx.article_id,
                    ctx.user_id,
                    format!("Comment {}", i),
                ))
                .await
                .expect("Failed to create comment");
        }

        let (comments, total) = ctx
            .repo
            .list_by_article(ctx.article_id, 1, 10)
            .await
            .expect("Failed to list");
        assert_eq!(total, 3);
        assert_eq!(comments.len(), 3);

        // Comments on a different article are not included
        let (other, other_total) = ctx
            .repo
            .list_by_article(999, 1, 10)
            .await
            .expect("Failed to list");
        assert_eq!(other_total, 0);
        assert!(other.is_empty());
    }
}
