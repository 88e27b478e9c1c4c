//! User model
//!
//! This module defines the User entity and related types for the Blogr system.
//!
//! Users reference a row in the `roles` table via `role_id`. The role name is
//! joined in by the repository so that authorization checks never need a
//! second query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::ROLE_ADMIN;

/// User entity representing a registered user in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Role ID (references roles table)
    pub role_id: i64,
    /// Role name (joined from roles table)
    pub role_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        role_id: i64,
        role_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            first_name: None,
            last_name: None,
            role_id,
            role_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role_name == ROLE_ADMIN
    }

    /// Check if the user can modify the given resource
    ///
    /// Admins can modify anything; regular users only what they own.
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

/// Input for updating a user
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New username (optional)
    pub username: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    /// New first name (optional)
    pub first_name: Option<String>,
    /// New last name (optional)
    pub last_name: Option<String>,
    /// New role ID (optional, admin only)
    pub role_id: Option<i64>,
}

impl UpdateUserInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.username.is_some()
            || self.email.is_some()
            || self.password.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.role_id.is_some()
    }
}
