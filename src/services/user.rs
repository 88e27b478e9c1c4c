//! User service
//!
//! Implements business logic for user management:
//! - Registration (first user becomes admin)
//! - Credential verification for sign-in
//! - Profile updates and soft deletion
//!
//! Token issuance lives in [`crate::services::token`]; this service only
//! deals with users and passwords.

use crate::db::repositories::{RoleRepository, UserRepository};
use crate::models::{UpdateUserInput, User, ROLE_ADMIN, ROLE_USER};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Check whether a repository error was caused by a UNIQUE constraint.
///
/// The users table keeps soft-deleted rows, so its UNIQUE constraints can
/// fire even when the duplicate pre-checks (which only see live rows) pass.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .map(|db| db.is_unique_violation())
            .unwrap_or(false)
    })
}

/// User service for managing users and credentials
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    role_repo: Arc<dyn RoleRepository>,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(user_repo: Arc<dyn UserRepository>, role_repo: Arc<dyn RoleRepository>) -> Self {
        Self {
            user_repo,
            role_repo,
        }
    }

    /// Register a new user
    ///
    /// If this is the first user in the system, they are assigned the
    /// admin role; everyone after that gets the regular user role.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username, email, or password is invalid
    /// - `UserExists` if username or email is already taken
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        // First user becomes admin
        let role_name = if self.is_first_user().await? {
            ROLE_ADMIN
        } else {
            ROLE_USER
        };
        let role = self
            .role_repo
            .get_by_name(role_name)
            .await
            .context("Failed to look up role")?
            .ok_or_else(|| anyhow::anyhow!("Built-in role '{}' is missing", role_name))?;

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let mut user = User::new(
            input.username,
            input.email,
            password_hash,
            role.id,
            role.name,
        );
        user.first_name = input.first_name;
        user.last_name = input.last_name;

        // The pre-checks above only see live rows, but the UNIQUE
        // constraints also cover soft-deleted ones.
        let created = match self.user_repo.create(&user).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                return Err(UserServiceError::UserExists(
                    "Username or email is already registered".to_string(),
                ));
            }
            Err(e) => {
                return Err(UserServiceError::InternalError(
                    e.context("Failed to create user"),
                ));
            }
        };

        Ok(created)
    }

    /// Verify credentials and return the matching user
    ///
    /// The identifier may be either a username or an email address.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` if no user matches or the password is wrong
    /// - `InternalError` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<User, UserServiceError> {
        let user = self
            .find_user_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError(
                    "Invalid username or password".to_string(),
                )
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// List users with pagination
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<User>, i64), UserServiceError> {
        let result = self
            .user_repo
            .list(page, per_page)
            .await
            .context("Failed to list users")?;

        Ok(result)
    }

    /// Update a user
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `UserExists` if the new username or email collides with another user
    /// - `InternalError` for database errors
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        if let Some(username) = input.username {
            if username.trim().is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Username cannot be empty".to_string(),
                ));
            }
            if let Some(existing) = self
                .user_repo
                .get_by_username(&username)
                .await
                .context("Failed to check username")?
            {
                if existing.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
            }
            user.username = username;
        }

        if let Some(email) = input.email {
            if !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email format".to_string(),
                ));
            }
            if let Some(existing) = self
                .user_repo
                .get_by_email(&email)
                .await
                .context("Failed to check email")?
            {
                if existing.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
            }
            user.email = email;
        }

        if let Some(password) = input.password {
            if password.is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Password cannot be empty".to_string(),
                ));
            }
            user.password_hash =
                hash_password(&password).context("Failed to hash password")?;
        }

        if let Some(first_name) = input.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = input.last_name {
            user.last_name = Some(last_name);
        }

        if let Some(role_id) = input.role_id {
            self.role_repo
                .get_by_id(role_id)
                .await
                .context("Failed to look up role")?
                .ok_or_else(|| {
                    UserServiceError::ValidationError(format!("Role {} does not exist", role_id))
                })?;
            user.role_id = role_id;
        }

        let updated = match self.user_repo.update(&user).await {
            Ok(updated) => updated,
            Err(e) if is_unique_violation(&e) => {
                return Err(UserServiceError::UserExists(
                    "Username or email is already registered".to_string(),
                ));
            }
            Err(e) => {
                return Err(UserServiceError::InternalError(
                    e.context("Failed to update user"),
                ));
            }
        };

        Ok(updated)
    }

    /// Soft-delete a user
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        self.user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        self.user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;

        Ok(())
    }

    /// Check if this is the first user (for auto-admin)
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;

        Ok(count == 0)
    }

    // ========================================================================
    // Private helper methods
    // ========================================================================

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        // Basic email format validation
        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }

        Ok(())
    }

    async fn find_user_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        let user = self
            .user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}
