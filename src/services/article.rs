//! Article service
//!
//! Implements business logic for article management:
//! - Create, read, update, delete articles
//! - Category existence checks
//! - Published-only listing for anonymous readers

use crate::db::repositories::{ArticleRepository, CategoryRepository};
use crate::models::{
    Article, CreateArticleInput, ListParams, PagedResult, UpdateArticleInput,
};
use anyhow::Context;
use std::sync::Arc;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found")]
    NotFound,

    /// Referenced category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service for managing blog articles
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    category_repo: Arc<dyn CategoryRepository>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        category_repo: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            repo,
            category_repo,
        }
    }

    /// Create a new article
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the title or body is empty
    /// - `CategoryNotFound` if the referenced category does not exist
    pub async fn create(
        &self,
        input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        if input.title.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.body.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Body cannot be empty".to_string(),
            ));
        }

        self.category_repo
            .get_by_id(input.category_id)
            .await
            .context("Failed to check category")?
            .ok_or(ArticleServiceError::CategoryNotFound(input.category_id))?;

        let article = Article::new(
            input.title,
            input.body,
            input.author_id,
            input.category_id,
            input.published,
        );

        let created = self
            .repo
            .create(&article)
            .await
            .context("Failed to create article")?;

        Ok(created)
    }

    /// Get article by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Article>, ArticleServiceError> {
        let article = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?;

        Ok(article)
    }

    /// List articles with pagination
    ///
    /// Anonymous readers pass `published_only = true` and never see drafts.
    pub async fn list(
        &self,
        params: &ListParams,
        published_only: bool,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let (items, total) = self
            .repo
            .list(params.page as i64, params.per_page as i64, published_only)
            .await
            .context("Failed to list articles")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Update an article
    ///
    /// # Errors
    ///
    /// - `NotFound` if the article does not exist
    /// - `CategoryNotFound` if the new category does not exist
    /// - `ValidationError` if the new title or body is empty
    pub async fn update(
        &self,
        id: i64,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let mut article = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or(ArticleServiceError::NotFound)?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            article.title = title;
        }

        if let Some(body) = input.body {
            if body.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Body cannot be empty".to_string(),
                ));
            }
            article.body = body;
        }

        if let Some(category_id) = input.category_id {
            self.category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to check category")?
                .ok_or(ArticleServiceError::CategoryNotFound(category_id))?;
            article.category_id = category_id;
        }

        if let Some(published) = input.published {
            article.published = published;
        }

        let updated = self
            .repo
            .update(&article)
            .await
            .context("Failed to update article")?;

        Ok(updated)
    }

    /// Soft-delete an article
    ///
    /// # Errors
    ///
    /// - `NotFound` if the article does not exist
    pub async fn delete(&self, id: i64) -> Result<(), ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or(ArticleServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete article")?;

        Ok(())
    }
}
