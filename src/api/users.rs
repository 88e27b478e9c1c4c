//! User API endpoints
//!
//! Handles HTTP requests for user management:
//! - GET /api/v1/users - List users with pagination (admin)
//! - GET /api/v1/users/{id} - Get user by ID (self or admin)
//! - PUT /api/v1/users/{id} - Update user (self or admin)
//! - DELETE /api/v1/users/{id} - Delete user (self or admin)
//!
//! Role changes are restricted to admins; a regular user cannot promote
//! themselves by passing a role_id to the update endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::UserResponse;
use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::UpdateUserInput;
use crate::services::user::UserServiceError;

/// Response for user list
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Request body for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i64>,
}

fn map_user_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::NotFound => ApiError::not_found("User not found"),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/users - List users with pagination (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let params = query.to_params();

    let (users, total) = state
        .user_service
        .list(params.page as i64, params.per_page as i64)
        .await
        .map_err(map_user_error)?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        page_size: params.per_page,
    }))
}

/// GET /api/v1/users/{id} - Get user by ID
///
/// Any authenticated user may read a profile; the password hash never
/// leaves the serialization boundary.
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let target = state
        .user_service
        .get_by_id(id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", id)))?;

    Ok(Json(target.into()))
}

/// PUT /api/v1/users/{id} - Update user
///
/// Users can update their own profile; admins can update anyone's.
/// Only admins may change role_id.
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !user.0.can_modify(id) {
        return Err(ApiError::forbidden(
            "You don't have permission to update this user",
        ));
    }

    if body.role_id.is_some() && !user.0.is_admin() {
        return Err(ApiError::forbidden("Only admins can change roles"));
    }

    let input = UpdateUserInput {
        username: body.username,
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        role_id: body.role_id,
    };

    let updated = state
        .user_service
        .update(id, input)
        .await
        .map_err(map_user_error)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/users/{id} - Delete user
///
/// Users can delete their own account; admins can delete anyone's.
/// The row is soft-deleted; the user's tokens stop working on the next
/// request because authentication re-loads the user.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !user.0.can_modify(id) {
        return Err(ApiError::forbidden(
            "You don't have permission to delete this user",
        ));
    }

    state
        .user_service
        .delete(id)
        .await
        .map_err(map_user_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, request, request_with_auth, signup_user, test_app};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_users_admin_only() {
        let app = test_app().await;
        let (admin_token, _) = signup_user(&app, "admin", "admin@example.com").await;
        let (user_token, _) = signup_user(&app, "bob", "bob@example.com").await;

        let response = app
            .clone()
            .oneshot(request_with_auth("GET", "/api/v1/users", None, &user_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request_with_auth("GET", "/api/v1/users", None, &admin_token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_get_user_requires_auth_but_not_ownership() {
        let app = test_app().await;
        let (_admin_token, admin_id) = signup_user(&app, "admin", "admin@example.com").await;
        let (bob_token, bob_id) = signup_user(&app, "bob", "bob@example.com").await;

        // Anonymous read is rejected
        let response = app
            .clone()
            .oneshot(request("GET", &format!("/api/v1/users/{}", bob_id), None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Any authenticated user may read any profile
        let response = app
            .clone()
            .oneshot(request_with_auth(
                "GET",
                &format!("/api/v1/users/{}", admin_id),
                None,
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["username"], "admin");
        // The password hash is never serialized
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_user_cannot_update_another_user() {
        let app = test_app().await;
        let (_admin_token, admin_id) = signup_user(&app, "admin", "admin@example.com").await;
        let (bob_token, _) = signup_user(&app, "bob", "bob@example.com").await;

        let response = app
            .oneshot(request_with_auth(
                "PUT",
                &format!("/api/v1/users/{}", admin_id),
                Some(serde_json::json!({"first_name": "Hijack"})),
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_change_role() {
        let app = test_app().await;
        let (_admin_token, _) = signup_user(&app, "admin", "admin@example.com").await;
        let (bob_token, bob_id) = signup_user(&app, "bob", "bob@example.com").await;

        let response = app
            .clone()
            .oneshot(request_with_auth(
                "PUT",
                &format!("/api/v1/users/{}", bob_id),
                Some(serde_json::json!({"role_id": 1})),
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Updating their own profile fields is fine
        let response = app
            .oneshot(request_with_auth(
                "PUT",
                &format!("/api/v1/users/{}", bob_id),
                Some(serde_json::json!({"first_name": "Bob"})),
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["first_name"], "Bob");
    }

    #[tokio::test]
    async fn test_deleted_user_loses_access() {
        let app = test_app().await;
        let (_admin_token, _) = signup_user(&app, "admin", "admin@example.com").await;
        let (bob_token, bob_id) = signup_user(&app, "bob", "bob@example.com").await;

        let response = app
            .clone()
            .oneshot(request_with_auth(
                "DELETE",
                &format!("/api/v1/users/{}", bob_id),
                None,
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // The token is still within its lifetime but the user is gone
        let response = app
            .oneshot(request_with_auth(
                "GET",
                &format!("/api/v1/users/{}", bob_id),
                None,
                &bob_token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_users_requires_token() {
        let app = test_app().await;

        let response = app
            .oneshot(request("GET", "/api/v1/users", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
