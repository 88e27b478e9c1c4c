//! Authentication API endpoints
//!
//! Handles HTTP requests for authentication:
//! - POST /api/v1/signup - User registration
//! - POST /api/v1/signin - User login
//! - POST /api/v1/signout - Clear the refresh cookie
//! - POST /api/v1/refresh-token - Exchange the refresh cookie for a new access token
//!
//! The refresh token travels only in an HTTP-only cookie named `rt`; the
//! access token is returned in the JSON body and sent back by clients in
//! the Authorization header.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::services::user::{LoginInput, RegisterInput, UserServiceError};

/// Name of the refresh token cookie
pub const REFRESH_COOKIE: &str = "rt";

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
}

/// Response for a refreshed access token
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Response for user info
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role_name,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build the auth router (all routes public)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/refresh-token", post(refresh_token))
}

/// Build the Set-Cookie value for a fresh refresh token
fn refresh_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        REFRESH_COOKIE, token, max_age_secs
    )
}

/// Build the Set-Cookie value that clears the refresh cookie
fn clear_refresh_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0",
        REFRESH_COOKIE
    )
}

/// Read the refresh token from the request's Cookie header
fn extract_refresh_token(request: &Request) -> Option<String> {
    let cookie_header = request.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(token) = cookie.strip_prefix(&format!("{}=", REFRESH_COOKIE)) {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    None
}

fn cookie_headers(cookie: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::internal_error(format!("Invalid cookie value: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

fn map_user_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::NotFound => ApiError::not_found("User not found"),
        UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// POST /api/v1/signup - User registration
///
/// The first registered user becomes an administrator. On success the
/// response carries an access token plus the refresh cookie, so signup
/// doubles as sign-in.
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut input = RegisterInput::new(body.username, body.email, body.password);
    input.first_name = body.first_name;
    input.last_name = body.last_name;

    let user = state
        .user_service
        .register(input)
        .await
        .map_err(map_user_error)?;

    let access_token = state
        .token_service
        .issue_access_token(user.id)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let refresh = state
        .token_service
        .issue_refresh_token(user.id)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let headers = cookie_headers(&refresh_cookie(
        &refresh,
        state.token_service.refresh_ttl_secs(),
    ))?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}

/// POST /api/v1/signin - User login
async fn signin(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .login(LoginInput::new(body.username_or_email, body.password))
        .await
        .map_err(map_user_error)?;

    let access_token = state
        .token_service
        .issue_access_token(user.id)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let refresh = state
        .token_service
        .issue_refresh_token(user.id)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let headers = cookie_headers(&refresh_cookie(
        &refresh,
        state.token_service.refresh_ttl_secs(),
    ))?;

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}

/// POST /api/v1/signout - Clear the refresh cookie
///
/// Always succeeds. After this the client holds no refresh token, so
/// refresh attempts fail until the next sign-in.
async fn signout() -> Result<impl IntoResponse, ApiError> {
    let headers = cookie_headers(&clear_refresh_cookie())?;

    Ok((
        StatusCode::OK,
        headers,
        Json(serde_json::json!({ "message": "Signed out" })),
    ))
}

/// POST /api/v1/refresh-token - Exchange the refresh cookie for a new access token
///
/// The user is re-loaded from the database, so a soft-deleted user cannot
/// refresh even with a valid cookie.
async fn refresh_token(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = extract_refresh_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

    let user_id = state
        .token_service
        .verify_refresh_token(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = state
        .user_service
        .get_by_id(user_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    let access_token = state
        .token_service
        .issue_access_token(user.id)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, request, request_with_cookie, test_app};
    use http_body_util::BodyExt as _;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_signup_sets_refresh_cookie() {
        let app = test_app().await;

        let response = app
            .oneshot(request(
                "POST",
                "/api/v1/signup",
                Some(serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Missing Set-Cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("rt="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        let body = body_json(response).await;
        assert_eq!(body["user"]["username"], "alice");
        // First user becomes admin
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["access_token"].as_str().unwrap().contains('.'));
    }

    #[tokio::test]
    async fn test_signup_duplicate_username_conflict() {
        let app = test_app().await;

        let signup = |username: &str, email: &str| {
            serde_json::json!({
                "username": username,
                "email": email,
                "password": "secret123"
            })
        };

        let response = app
            .clone()
            .oneshot(request("POST", "/api/v1/signup", Some(signup("alice", "a@example.com")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(request("POST", "/api/v1/signup", Some(signup("alice", "b@example.com")), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_signin_and_refresh_flow() {
        let app = test_app().await;

        app.clone()
            .oneshot(request(
                "POST",
                "/api/v1/signup",
                Some(serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/signin",
                Some(serde_json::json!({
                    "username_or_email": "alice",
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let rt = cookie.split(';').next().unwrap().to_string();

        // Refresh with the cookie yields a fresh access token
        let response = app
            .oneshot(request_with_cookie("POST", "/api/v1/refresh-token", None, &rt))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["access_token"].as_str().unwrap().contains('.'));
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let app = test_app().await;

        app.clone()
            .oneshot(request(
                "POST",
                "/api/v1/signup",
                Some(serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(request(
                "POST",
                "/api/v1/signin",
                Some(serde_json::json!({
                    "username_or_email": "alice",
                    "password": "wrong"
                })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signout_clears_cookie_and_refresh_fails() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(request("POST", "/api/v1/signout", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("rt=;"));
        assert!(cookie.contains("Max-Age=0"));

        // A client honoring the cleared cookie sends no refresh token
        let response = app
            .oneshot(request("POST", "/api/v1/refresh-token", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_with_garbage_token_rejected() {
        let app = test_app().await;

        let response = app
            .oneshot(request_with_cookie(
                "POST",
                "/api/v1/refresh-token",
                None,
                "rt=not-a-real-token",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh_token() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/signup",
                Some(serde_json::json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let access = json["access_token"].as_str().unwrap().to_string();

        // Tokens are signed with separate secrets; kinds cannot be swapped
        let response = app
            .oneshot(request_with_cookie(
                "POST",
                "/api/v1/refresh-token",
                None,
                &format!("rt={}", access),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
