//! Role model
//!
//! Roles are stored as database rows rather than an enum so that
//! administrators can manage them through the API. Two roles are seeded
//! by the migrations and must always exist: `admin` and `user`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the built-in administrator role
pub const ROLE_ADMIN: &str = "admin";

/// Name of the built-in regular user role
pub const ROLE_USER: &str = "user";

/// Role entity for authorization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    /// Unique identifier
    pub id: i64,
    /// Role name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new Role with the given name.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this role is one of the seeded built-ins
    pub fn is_builtin(&self) -> bool {
        self.name == ROLE_ADMIN || self.name == ROLE_USER
    }
}

/// Input for creating a new role
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleInput {
    /// Role name
    pub name: String,
}

/// Input for updating a role
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleInput {
    /// New name (optional)
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_new() {
        let role = Role::new("moderator".to_string());
        assert_eq!(role.id, 0);
        assert_eq!(role.name, "moderator");
    }

    #[test]
    fn test_role_is_builtin() {
        assert!(Role::new(ROLE_ADMIN.to_string()).is_builtin());
        assert!(Role::new(ROLE_USER.to_string()).is_builtin());
        assert!(!Role::new("moderator".to_string()).is_builtin());
    }
}
