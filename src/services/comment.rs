//! Comment service
//!
//! Implements business logic for comments:
//! - Posting comments on existing articles
//! - Per-article listing
//! - Editing and soft-deleting comments

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{Comment, CreateCommentInput, ListParams, PagedResult, UpdateCommentInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment not found
    #[error("Comment not found")]
    NotFound,

    /// Referenced article not found
    #[error("Article not found: {0}")]
    ArticleNotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service for managing article comments
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(
        repo: Arc<dyn CommentRepository>,
        article_repo: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self { repo, article_repo }
    }

    /// Post a new comment
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the content is empty
    /// - `ArticleNotFound` if the article does not exist
    pub async fn create(
        &self,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        if input.content.trim().is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment content cannot be empty".to_string(),
            ));
        }

        self.article_repo
            .get_by_id(input.article_id)
            .await
            .context("Failed to check article")?
            .ok_or(CommentServiceError::ArticleNotFound(input.article_id))?;

        let created = self
            .repo
            .create(&Comment::new(input.article_id, input.user_id, input.content))
            .await
            .context("Failed to create comment")?;

        Ok(created)
    }

    /// Get comment by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?;

        Ok(comment)
    }

    /// List comments for an article with pagination
    ///
    /// # Errors
    ///
    /// - `ArticleNotFound` if the article does not exist
    pub async fn list_by_article(
        &self,
        article_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Comment>, CommentServiceError> {
        self.article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to check article")?
            .ok_or(CommentServiceError::ArticleNotFound(article_id))?;

        let (items, total) = self
            .repo
            .list_by_article(article_id, params.page as i64, params.per_page as i64)
            .await
            .context("Failed to list comments")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Update a comment's content
    ///
    /// # Errors
    ///
    /// - `NotFound` if the comment does not exist
    /// - `ValidationError` if the new content is empty
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let mut comment = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(CommentServiceError::ValidationError(
                    "Comment content cannot be empty".to_string(),
                ));
            }
            comment.content = content;
        }

        let updated = self
            .repo
            .update(&comment)
            .await
            .context("Failed to update comment")?;

        Ok(updated)
    }

    /// Soft-delete a comment
    ///
    /// # Errors
    ///
    /// - `NotFound` if the comment does not exist
    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete comment")?;

        Ok(())
    }
}
