//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the blog backend:
//! - Auth endpoints (signup, signin, signout, refresh)
//! - User endpoints
//! - Role endpoints (admin)
//! - Article endpoints
//! - Category endpoints
//! - Comment endpoints
//!
//! Route groups are layered rather than guarded per-handler: public
//! routes carry no auth middleware, article reads carry `optional_auth`,
//! member routes carry `require_auth`, and admin routes additionally
//! carry `require_admin`.

pub mod articles;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod middleware;
pub mod roles;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .nest("/roles", roles::router())
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", put(categories::update_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .route("/articles", post(articles::create_article))
        .route("/articles/{id}", put(articles::update_article))
        .route("/articles/{id}", delete(articles::delete_article))
        .route("/comments", post(comments::create_comment))
        .route("/comments/{id}", put(comments::update_comment))
        .route("/comments/{id}", delete(comments::delete_comment))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Article reads are public but see more when authenticated
    let article_reads = Router::new()
        .route("/articles", get(articles::list_articles))
        .route("/articles/{id}", get(articles::get_article))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .merge(auth::router())
        .nest("/categories", categories::public_router())
        .route("/comments/article/{article_id}", get(comments::list_comments))
        .route("/comments/{id}", get(comments::get_comment))
        .merge(article_reads)
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS must allow credentials for the refresh cookie to travel
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
            HeaderValue::from_static("http://localhost:3000")
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared helpers for exercising the router in tests.

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, Response};
    use axum::Router;
    use http_body_util::BodyExt as _;
    use tower::ServiceExt;

    use crate::config::AuthConfig;
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCategoryRepository, SqlxCommentRepository,
        SqlxRoleRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::{
        ArticleService, CategoryService, CommentService, RoleService, TokenService, UserService,
    };

    use super::middleware::AppState;

    /// Build a router backed by a fresh in-memory database.
    pub async fn test_app() -> Router {
        let auth_config = AuthConfig {
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
            access_token_ttl_minutes: 5,
            refresh_token_ttl_days: 7,
        };

        test_app_with_token_service(TokenService::new(&auth_config)).await
    }

    /// Build a router with a caller-supplied token service, e.g. one with
    /// negative TTLs to mint already-expired tokens.
    pub async fn test_app_with_token_service(token_service: TokenService) -> Router {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let role_repo = SqlxRoleRepository::boxed(pool.clone());
        let article_repo = SqlxArticleRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());

        let state = AppState {
            user_service: Arc::new(UserService::new(user_repo, role_repo.clone())),
            role_service: Arc::new(RoleService::new(role_repo)),
            article_service: Arc::new(ArticleService::new(
                article_repo.clone(),
                category_repo.clone(),
            )),
            category_service: Arc::new(CategoryService::new(category_repo)),
            comment_service: Arc::new(CommentService::new(comment_repo, article_repo)),
            token_service: Arc::new(token_service),
        };

        super::build_router(state, "http://localhost:3000")
    }

    /// Build a request with an optional JSON body.
    pub fn request(
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        bearer: Option<&str>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// Build an authenticated request.
    pub fn request_with_auth(
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        token: &str,
    ) -> Request<Body> {
        request(method, uri, body, Some(token))
    }

    /// Build a request carrying a Cookie header.
    pub fn request_with_cookie(
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        cookie: &str,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);

        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => {
                builder = builder.header(header::CONTENT_LENGTH, "0");
                builder.body(Body::empty()).unwrap()
            }
        }
    }

    /// Collect a response body into JSON.
    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Sign up a user and return their access token and id.
    pub async fn signup_user(app: &Router, username: &str, email: &str) -> (String, i64) {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/signup",
                Some(serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": "secret123"
                })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);

        let body = body_json(response).await;
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{request, test_app};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_404() {
        let app = test_app().await;

        let response = app
            .oneshot(request("GET", "/api/v1/nonsense", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_garbage_token() {
        let app = test_app().await;

        let response = app
            .oneshot(request("GET", "/api/v1/users", None, Some("not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_access_token_rejected() {
        // A token service whose access tokens are already expired when minted
        let token_service = crate::services::TokenService::with_ttls(
            "test-access-secret",
            "test-refresh-secret",
            chrono::Duration::minutes(-5),
            chrono::Duration::days(7),
        );
        let app = super::test_support::test_app_with_token_service(token_service).await;

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
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = super::test_support::body_json(response).await;
        let expired = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("GET", "/api/v1/users", None, Some(&expired)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
