//! Role API endpoints
//!
//! Handles HTTP requests for role management (all admin-only):
//! - GET /api/v1/roles - List roles
//! - GET /api/v1/roles/{id} - Get role by ID
//! - POST /api/v1/roles - Create new role
//! - PUT /api/v1/roles/{id} - Update role
//! - DELETE /api/v1/roles/{id} - Delete role
//!
//! The built-in "admin" and "user" roles cannot be renamed or deleted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateRoleInput, UpdateRoleInput};
use crate::services::role::RoleServiceError;

/// Response for role list
#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<RoleResponse>,
}

/// Response for a single role
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::models::Role> for RoleResponse {
    fn from(role: crate::models::Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            created_at: role.created_at.to_rfc3339(),
            updated_at: role.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a role
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
}

/// Request body for updating a role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
}

/// Build the roles router (mounted behind admin middleware)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles))
        .route("/", post(create_role))
        .route("/{id}", get(get_role))
        .route("/{id}", put(update_role))
        .route("/{id}", delete(delete_role))
}

fn map_role_error(e: RoleServiceError) -> ApiError {
    match e {
        RoleServiceError::NotFound => ApiError::not_found("Role not found"),
        RoleServiceError::DuplicateName(name) => {
            ApiError::conflict(format!("Role name already exists: {}", name))
        }
        RoleServiceError::BuiltinRole => {
            ApiError::forbidden("Built-in roles cannot be modified")
        }
        RoleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        RoleServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/roles - List all roles
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<RoleListResponse>, ApiError> {
    let roles = state.role_service.list().await.map_err(map_role_error)?;

    Ok(Json(RoleListResponse {
        roles: roles.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/roles/{id} - Get role by ID
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = state
        .role_service
        .get_by_id(id)
        .await
        .map_err(map_role_error)?
        .ok_or_else(|| ApiError::not_found(format!("Role not found: {}", id)))?;

    Ok(Json(role.into()))
}

/// POST /api/v1/roles - Create new role
pub async fn create_role(
    State(state): State<AppState>,
    Json(body): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let role = state
        .role_service
        .create(CreateRoleInput { name: body.name })
        .await
        .map_err(map_role_error)?;

    Ok((StatusCode::CREATED, Json(role.into())))
}

/// PUT /api/v1/roles/{id} - Update role
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = state
        .role_service
        .update(id, UpdateRoleInput { name: body.name })
        .await
        .map_err(map_role_error)?;

    Ok(Json(role.into()))
}

/// DELETE /api/v1/roles/{id} - Delete role
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.role_service.delete(id).await.map_err(map_role_error)?;

    Ok(StatusCode::NO_CONTENT)
}
