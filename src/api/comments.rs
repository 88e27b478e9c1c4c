//! Comment API endpoints
//!
//! Handles HTTP requests for comment management:
//! - GET /api/v1/comments/article/{article_id} - List comments for an article (public)
//! - POST /api/v1/comments - Create new comment (authenticated)
//! - PUT /api/v1/comments/{id} - Update comment (owner or admin)
//! - DELETE /api/v1/comments/{id} - Delete comment (owner or admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateCommentInput, UpdateCommentInput};
use crate::services::comment::CommentServiceError;

/// Response for comment list
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Response for a single comment
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Comment> for CommentResponse {
    fn from(comment: crate::models::Comment) -> Self {
        Self {
            id: comment.id,
            article_id: comment.article_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a comment
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub article_id: i64,
    pub content: String,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

fn map_comment_error(e: CommentServiceError) -> ApiError {
    match e {
        CommentServiceError::NotFound => ApiError::not_found("Comment not found"),
        CommentServiceError::ArticleNotFound(id) => {
            ApiError::not_found(format!("Article not found: {}", id))
        }
        CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CommentServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/comments/article/{article_id} - List comments for an article
pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let params = query.to_params();

    let result = state
        .comment_service
        .list_by_article(article_id, &params)
        .await
        .map_err(map_comment_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(CommentListResponse {
        comments: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/v1/comments/{id} - Get comment by ID
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state
        .comment_service
        .get_by_id(id)
        .await
        .map_err(map_comment_error)?
        .ok_or_else(|| ApiError::not_found(format!("Comment not found: {}", id)))?;

    Ok(Json(comment.into()))
}

/// POST /api/v1/comments - Create new comment
///
/// The comment is always attributed to the authenticated user.
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let input = CreateCommentInput {
        article_id: body.article_id,
        user_id: user.0.id,
        content: body.content,
    };

    let comment = state
        .comment_service
        .create(input)
        .await
        .map_err(map_comment_error)?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// PUT /api/v1/comments/{id} - Update comment
///
/// Only the comment's author or an admin may edit.
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let existing = state
        .comment_service
        .get_by_id(id)
        .await
        .map_err(map_comment_error)?
        .ok_or_else(|| ApiError::not_found(format!("Comment not found: {}", id)))?;

    if !user.0.can_modify(existing.user_id) {
        return Err(ApiError::forbidden(
            "You don't have permission to edit this comment",
        ));
    }

    let comment = state
        .comment_service
        .update(id, UpdateCommentInput { content: body.content })
        .await
        .map_err(map_comment_error)?;

    Ok(Json(comment.into()))
}

/// DELETE /api/v1/comments/{id} - Delete comment
///
/// Only the comment's author or an admin may delete.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .comment_service
        .get_by_id(id)
        .await
        .map_err(map_comment_error)?
        .ok_or_else(|| ApiError::not_found(format!("Comment not found: {}", id)))?;

    if !user.0.can_modify(existing.user_id) {
        return Err(ApiError::forbidden(
            "You don't have permission to delete this comment",
        ));
    }

    state
        .comment_service
        .delete(id)
        .await
        .map_err(map_comment_error)?;

    Ok(StatusCode::NO_CONTENT)
}
