//! Article repository
//!
//! Database operations for articles. Listing supports an optional
//! published-only filter so anonymous readers never see drafts.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Article;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, article: &Article) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Update an article
    async fn update(&self, article: &Article) -> Result<Article>;

    /// Soft-delete an article
    async fn delete(&self, id: i64) -> Result<()>;

    /// List articles with pagination, optionally restricted to published ones
    async fn list(
        &self,
        page: i64,
        per_page: i64,
        published_only: bool,
    ) -> Result<(Vec<Article>, i64)>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, article: &Article) -> Result<Article> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_article_sqlite(self.pool.as_sqlite().unwrap(), article).await
            }
            DatabaseDriver::Mysql => {
                create_article_mysql(self.pool.as_mysql().unwrap(), article).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_article_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_article_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, article: &Article) -> Result<Article> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_article_sqlite(self.pool.as_sqlite().unwrap(), article).await
            }
            DatabaseDriver::Mysql => {
                update_article_mysql(self.pool.as_mysql().unwrap(), article).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_article_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_article_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(
        &self,
        page: i64,
        per_page: i64,
        published_only: bool,
    ) -> Result<(Vec<Article>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_articles_sqlite(self.pool.as_sqlite().unwrap(), page, per_page, published_only)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_articles_mysql(self.pool.as_mysql().unwrap(), page, per_page, published_only)
                    .await
            }
        }
    }
}

const SELECT_ARTICLE: &str = r#"
    SELECT id, title, body, author_id, category_id, published, created_at, updated_at
    FROM articles
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, body, author_id, category_id, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.body)
    .bind(article.author_id)
    .bind(article.category_id)
    .bind(article.published)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create article")?;

    let id = result.last_insert_rowid();

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back created article")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_article_sqlite(&row))
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    Ok(row.map(|r| row_to_article_sqlite(&r)))
}

async fn update_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        UPDATE articles
        SET title = ?, body = ?, category_id = ?, published = ?, updated_at = ?
        WHERE id = ? AND deleted = FALSE
        "#,
    )
    .bind(&article.title)
    .bind(&article.body)
    .bind(article.category_id)
    .bind(article.published)
    .bind(now)
    .bind(article.id)
    .execute(&mut *tx)
    .await
    .context("Failed to update article")?;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(article.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read back updated article")?
        .ok_or_else(|| anyhow::anyhow!("Article not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_article_sqlite(&row))
}

async fn delete_article_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE articles SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete article")?;

    Ok(())
}

async fn list_articles_sqlite(
    pool: &SqlitePool,
    page: i64,
    per_page: i64,
    published_only: bool,
) -> Result<(Vec<Article>, i64)> {
    let offset = (page - 1) * per_page;
    let filter = if published_only {
        "WHERE deleted = FALSE AND published = TRUE"
    } else {
        "WHERE deleted = FALSE"
    };

    let rows = sqlx::query(&format!(
        "{} {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        SELECT_ARTICLE, filter
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let articles = rows.iter().map(row_to_article_sqlite).collect();

    let count_row = sqlx::query(&format!("SELECT COUNT(*) as count FROM articles {}", filter))
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;
    let total: i64 = count_row.get("count");

    Ok((articles, total))
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        published: row.get("published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_article_mysql(pool: &MySqlPool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO articles (title, body, author_id, category_id, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.title)
    .bind(&article.body)
    .bind(article.author_id)
    .bind(article.category_id)
    .bind(article.published)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .context("Failed to create article")?;

    let id = result.last_insert_id() as i64;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back created article")?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_article_mysql(&row))
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    Ok(row.map(|r| row_to_article_mysql(&r)))
}

async fn update_article_mysql(pool: &MySqlPool, article: &Article) -> Result<Article> {
    let now = Utc::now();

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        UPDATE articles
        SET title = ?, body = ?, category_id = ?, published = ?, updated_at = ?
        WHERE id = ? AND deleted = FALSE
        "#,
    )
    .bind(&article.title)
    .bind(&article.body)
    .bind(article.category_id)
    .bind(article.published)
    .bind(now)
    .bind(article.id)
    .execute(&mut *tx)
    .await
    .context("Failed to update article")?;

    let row = sqlx::query(&format!("{} WHERE id = ? AND deleted = FALSE", SELECT_ARTICLE))
        .bind(article.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to read back updated article")?
        .ok_or_else(|| anyhow::anyhow!("Article not found after update"))?;

    tx.commit().await.context("Failed to commit transaction")?;

    Ok(row_to_article_mysql(&row))
}

async fn delete_article_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    let now = Utc::now();

    sqlx::query(
        "UPDATE articles SET deleted = TRUE, deleted_at = ? WHERE id = ? AND deleted = FALSE",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to delete article")?;

    Ok(())
}

async fn list_articles_mysql(
    pool: &MySqlPool,
    page: i64,
    per_page: i64,
    published_only: bool,
) -> Result<(Vec<Article>, i64)> {
    let offset = (page - 1) * per_page;
    let filter = if published_only {
        "WHERE deleted = FALSE AND published = TRUE"
    } else {
        "WHERE deleted = FALSE"
    };

    let rows = sqlx::query(&format!(
        "{} {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        SELECT_ARTICLE, filter
    ))
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let articles = rows.iter().map(row_to_article_mysql).collect();

    let count_row = sqlx::query(&format!("SELECT COUNT(*) as count FROM articles {}", filter))
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;
    let total: i64 = count_row.get("count");

    Ok((articles, total))
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        published: row.get("published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxUserRepository, CategoryRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Category, User, ROLE_USER};

    struct TestContext {
        repo: SqlxArticleRepository,
        author_id: i64,
        category_id: i64,
    }

    async fn setup() -> TestContext {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&User::new(
                "author".to_string(),
                "author@example.com".to_string(),
                "hash".to_string(),
                2,
                ROLE_USER.to_string(),
            ))
            .await
            .expect("Failed to create author");

        let categories = SqlxCategoryRepository::new(pool.clone());
        let category = categories
            .create(&Category::new("General".to_string()))
            .await
            .expect("Failed to create category");

        TestContext {
            repo: SqlxArticleRepository::new(pool),
            author_id: author.id,
            category_id: category.id,
        }
    }

    fn make_article(ctx: &TestContext, title: &str, published: bool) -> Article {
        Article::new(
            title.to_string(),
            "Body text".to_string(),
            ctx.author_id,
            ctx.category_id,
            published,
        )
    }

    #[tokio::test]
    async fn test_create_article() {
        let ctx = setup().await;

        let created = ctx
            .repo
            .create(&make_article(&ctx, "Hello", false))
            .await
            .expect("Failed to create article");

        assert!(created.id > 0);
        assert_eq!(created.title, "Hello");
        assert!(!created.published);
    }

    #[tokio::test]
    async fn test_get_article_by_id() {
        let ctx = setup().await;
        let created = ctx
            .repo
            .create(&make_article(&ctx, "Findable", true))
            .await
            .expect("Failed to create article");

        let found = ctx
            .repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get article")
            .expect("Article not found");

        assert_eq!(found.title, "Findable");
        assert!(found.published);
    }

    #[tokio::test]
    async fn test_update_article() {
        let ctx = setup().await;
        let created = ctx
            .repo
            .create(&make_article(&ctx, "Draft", false))
            .await
            .expect("Failed to create article");

        let mut article = created.clone();
        article.title = "Final".to_string();
        article.published = true;

        let updated = ctx.repo.update(&article).await.expect("Failed to update");
        assert_eq!(updated.title, "Final");
        assert!(updated.published);
    }

    #[tokio::test]
    async fn test_delete_article_is_soft() {
        let ctx = setup().await;
        let created = ctx
            .repo
            .create(&make_article(&ctx, "Doomed", true))
            .await
            .expect("Failed to create article");

        ctx.repo.delete(created.id).await.expect("Failed to delete");

        assert!(ctx.repo.get_by_id(created.id).await.unwrap().is_none());

        let (articles, total) = ctx.repo.list(1, 10, false).await.expect("Failed to list");
        assert_eq!(total, 0);
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_list_published_only_excludes_drafts() {
        let ctx = setup().await;
        ctx.repo
            .create(&make_article(&ctx, "Draft", false))
            .await
            .expect("Failed to create article");
        ctx.repo
            .create(&make_article(&ctx, "Live", true))
            .await
            .expect("Failed to create article");

        let (all, all_total) = ctx.repo.list(1, 10, false).await.expect("Failed to list");
        assert_eq!(all_total, 2);
        assert_eq!(all.len(), 2);

        let (published, total) = ctx.repo.list(1, 10, true).await.expect("Failed to list");
        assert_eq!(total, 1);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Live");
    }

    #[tokio::test]
    async fn test_list_articles_pagination() {
        let ctx = setup().await;
        for i in 0..5 {
            ctx.repo
                .create(&make_article(&ctx, &format!("Article {}", i), true))
                .await
                .expect("Failed to create article");
        }

        let (page1, total) = ctx.repo.list(1, 2, true).await.expect("Failed to list");
        assert_eq!(total, 5);
        assert_eq!(page1.len(), 2);

        let (page3, _) = ctx.repo.list(3, 2, true).await.expect("Failed to list");
        assert_eq!(page3.len(), 1);
    }
}
