//! Role service
//!
//! Implements business logic for role management:
//! - Create, read, update, delete roles
//! - Name uniqueness validation
//! - Protection of the seeded built-in roles

use crate::db::repositories::RoleRepository;
use crate::models::{CreateRoleInput, Role, UpdateRoleInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for role service operations
#[derive(Debug, thiserror::Error)]
pub enum RoleServiceError {
    /// Role name already exists
    #[error("Role name already exists: {0}")]
    DuplicateName(String),

    /// Role not found
    #[error("Role not found")]
    NotFound,

    /// Built-in roles cannot be renamed or deleted
    #[error("Built-in role cannot be modified")]
    BuiltinRole,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Role service for managing authorization roles
pub struct RoleService {
    repo: Arc<dyn RoleRepository>,
}

impl RoleService {
    /// Create a new role service
    pub fn new(repo: Arc<dyn RoleRepository>) -> Self {
        Self { repo }
    }

    /// Create a new role
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the name is empty
    /// - `DuplicateName` if a role with the same name exists
    pub async fn create(&self, input: CreateRoleInput) -> Result<Role, RoleServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(RoleServiceError::ValidationError(
                "Role name cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_name(&name)
            .await
            .context("Failed to check role name")?
            .is_some()
        {
            return Err(RoleServiceError::DuplicateName(name));
        }

        let created = self
            .repo
            .create(&Role::new(name))
            .await
            .context("Failed to create role")?;

        Ok(created)
    }

    /// Get role by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Role>, RoleServiceError> {
        let role = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get role")?;

        Ok(role)
    }

    /// List all roles
    pub async fn list(&self) -> Result<Vec<Role>, RoleServiceError> {
        let roles = self.repo.list().await.context("Failed to list roles")?;

        Ok(roles)
    }

    /// Update a role
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `BuiltinRole` if the role is one of the seeded built-ins
    /// - `DuplicateName` if the new name collides with another role
    pub async fn update(&self, id: i64, input: UpdateRoleInput) -> Result<Role, RoleServiceError> {
        let mut role = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get role")?
            .ok_or(RoleServiceError::NotFound)?;

        if role.is_builtin() {
            return Err(RoleServiceError::BuiltinRole);
        }

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RoleServiceError::ValidationError(
                    "Role name cannot be empty".to_string(),
                ));
            }
            if let Some(existing) = self
                .repo
                .get_by_name(&name)
                .await
                .context("Failed to check role name")?
            {
                if existing.id != id {
                    return Err(RoleServiceError::DuplicateName(name));
                }
            }
            role.name = name;
        }

        let updated = self
            .repo
            .update(&role)
            .await
            .context("Failed to update role")?;

        Ok(updated)
    }

    /// Soft-delete a role
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `BuiltinRole` if the role is one of the seeded built-ins
    pub async fn delete(&self, id: i64) -> Result<(), RoleServiceError> {
        let role = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get role")?
            .ok_or(RoleServiceError::NotFound)?;

        if role.is_builtin() {
            return Err(RoleServiceError::BuiltinRole);
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete role")?;

        Ok(())
    }
}
