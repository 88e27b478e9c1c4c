//! Article API endpoints
//!
//! Handles HTTP requests for article management:
//! - GET /api/v1/articles - List articles with pagination
//! - GET /api/v1/articles/{id} - Get article by ID
//! - POST /api/v1/articles - Create new article
//! - PUT /api/v1/articles/{id} - Update article
//! - DELETE /api/v1/articles/{id} - Delete article
//!
//! Listing and reads are public but run behind `optional_auth`: anonymous
//! readers only see published articles, while signed-in users also see
//! drafts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::services::article::ArticleServiceError;

/// Response for article list
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Response for a single article
#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub category_id: i64,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Article> for ArticleResponse {
    fn from(article: crate::models::Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            body: article.body,
            author_id: article.author_id,
            category_id: article.category_id,
            published: article.published,
            created_at: article.created_at.to_rfc3339(),
            updated_at: article.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating an article
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    pub category_id: i64,
    #[serde(default)]
    pub published: bool,
}

/// Request body for updating an article
#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category_id: Option<i64>,
    pub published: Option<bool>,
}

fn map_article_error(e: ArticleServiceError) -> ApiError {
    match e {
        ArticleServiceError::NotFound => ApiError::not_found("Article not found"),
        ArticleServiceError::CategoryNotFound(id) => ApiError::with_details(
            "VALIDATION_ERROR",
            format!("Category not found: {}", id),
            serde_json::json!({"field": "category_id", "value": id}),
        ),
        ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        ArticleServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/articles - List articles with pagination
pub async fn list_articles(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let params = query.to_params();
    let published_only = user.is_none();

    let result = state
        .article_service
        .list(&params, published_only)
        .await
        .map_err(map_article_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(ArticleListResponse {
        articles: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/v1/articles/{id} - Get article by ID
///
/// Unpublished articles return 404 to anonymous readers.
pub async fn get_article(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .article_service
        .get_by_id(id)
        .await
        .map_err(map_article_error)?
        .ok_or_else(|| ApiError::not_found(format!("Article not found: {}", id)))?;

    if !article.published && user.is_none() {
        return Err(ApiError::not_found(format!("Article not found: {}", id)));
    }

    Ok(Json(article.into()))
}

/// POST /api/v1/articles - Create new article
///
/// The author is always the authenticated user; the request body cannot
/// assign authorship to someone else.
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    let input = crate::models::CreateArticleInput {
        title: body.title,
        body: body.body,
        author_id: user.0.id,
        category_id: body.category_id,
        published: body.published,
    };

    let article = state
        .article_service
        .create(input)
        .await
        .map_err(map_article_error)?;

    Ok((StatusCode::CREATED, Json(article.into())))
}

/// PUT /api/v1/articles/{id} - Update article
///
/// Only the author or an admin may edit.
pub async fn update_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let existing = state
        .article_service
        .get_by_id(id)
        .await
        .map_err(map_article_error)?
        .ok_or_else(|| ApiError::not_found(format!("Article not found: {}", id)))?;

    if !user.0.can_modify(existing.author_id) {
        return Err(ApiError::forbidden(
            "You don't have permission to edit this article",
        ));
    }

    let input = crate::models::UpdateArticleInput {
        title: body.title,
        body: body.body,
        category_id: body.category_id,
        published: body.published,
    };

    let article = state
        .article_service
        .update(id, input)
        .await
        .map_err(map_article_error)?;

    Ok(Json(article.into()))
}

/// DELETE /api/v1/articles/{id} - Delete article
///
/// Only the author or an admin may delete. The row is soft-deleted and
/// disappears from all subsequent reads.
pub async fn delete_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .article_service
        .get_by_id(id)
        .await
        .map_err(map_article_error)?
        .ok_or_else(|| ApiError::not_found(format!("Article not found: {}", id)))?;

    if !user.0.can_modify(existing.author_id) {
        return Err(ApiError::forbidden(
            "You don't have permission to delete this article",
        ));
    }

    state
        .article_service
        .delete(id)
        .await
        .map_err(map_article_error)?;

    Ok(StatusCode::NO_CONTENT)
}
