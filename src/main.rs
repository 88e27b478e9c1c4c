//! Blogr - A blog publishing backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogr::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxCategoryRepository, SqlxCommentRepository,
            SqlxRoleRepository, SqlxUserRepository,
        },
    },
    services::{
        article::ArticleService, category::CategoryService, comment::CommentService,
        role::RoleService, token::TokenService, user::UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogr=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blogr API server...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let role_repo = SqlxRoleRepository::boxed(pool.clone());
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo, role_repo.clone()));
    let role_service = Arc::new(RoleService::new(role_repo));
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        category_repo.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_repo));
    let comment_service = Arc::new(CommentService::new(comment_repo, article_repo));
    let token_service = Arc::new(TokenService::new(&config.auth));

    let state = AppState {
        user_service,
        role_service,
        article_service,
        category_service,
        comment_service,
        token_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
