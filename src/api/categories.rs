//! Category API endpoints
//!
//! Handles HTTP requests for category management:
//! - GET /api/v1/categories - List categories with pagination (public)
//! - GET /api/v1/categories/{id} - Get category by ID (public)
//! - POST /api/v1/categories - Create new category (admin)
//! - PUT /api/v1/categories/{id} - Update category (admin)
//! - DELETE /api/v1/categories/{id} - Delete category (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateCategoryInput, UpdateCategoryInput};
use crate::services::category::CategoryServiceError;

/// Response for category list
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Response for a single category
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Category> for CategoryResponse {
    fn from(category: crate::models::Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Request body for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
}

/// Build the public categories router (read-only)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category))
}

fn map_category_error(e: CategoryServiceError) -> ApiError {
    match e {
        CategoryServiceError::NotFound => ApiError::not_found("Category not found"),
        CategoryServiceError::DuplicateName(name) => {
            ApiError::conflict(format!("Category name already exists: {}", name))
        }
        CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CategoryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/categories - List categories with pagination
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let params = query.to_params();

    let result = state
        .category_service
        .list(&params)
        .await
        .map_err(map_category_error)?;

    let total = result.total;
    let page = result.page;
    let page_size = result.per_page;
    let total_pages = result.total_pages();

    Ok(Json(CategoryListResponse {
        categories: result.items.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /api/v1/categories/{id} - Get category by ID
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .get_by_id(id)
        .await
        .map_err(map_category_error)?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {}", id)))?;

    Ok(Json(category.into()))
}

/// POST /api/v1/categories - Create new category (admin only)
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state
        .category_service
        .create(CreateCategoryInput { name: body.name })
        .await
        .map_err(map_category_error)?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /api/v1/categories/{id} - Update category (admin only)
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .update(id, UpdateCategoryInput { name: body.name })
        .await
        .map_err(map_category_error)?;

    Ok(Json(category.into()))
}

/// DELETE /api/v1/categories/{id} - Delete category (admin only)
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .category_service
        .delete(id)
        .await
        .map_err(map_category_error)?;

    Ok(StatusCode::NO_CONTENT)
}
