//! Category service
//!
//! Implements business logic for category management:
//! - Create, read, update, delete categories
//! - Name validation

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, ListParams, PagedResult, UpdateCategoryInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Category name already exists
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing blog categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the name is empty
    /// - `DuplicateName` if a category with the same name exists
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_name(&name)
            .await
            .context("Failed to check category name")?
            .is_some()
        {
            return Err(CategoryServiceError::DuplicateName(name));
        }

        let created = self
            .repo
            .create(&Category::new(name))
            .await
            .context("Failed to create category")?;

        Ok(created)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?;

        Ok(category)
    }

    /// List categories with pagination
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Category>, CategoryServiceError> {
        let (items, total) = self
            .repo
            .list(params.page as i64, params.per_page as i64)
            .await
            .context("Failed to list categories")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Update a category
    ///
    /// # Errors
    ///
    /// - `NotFound` if the category does not exist
    /// - `ValidationError` if the new name is empty
    /// - `DuplicateName` if the new name collides with another category
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)?;

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CategoryServiceError::ValidationError(
                    "Category name cannot be empty".to_string(),
                ));
            }
            if name != category.name {
                if self
                    .repo
                    .get_by_name(&name)
                    .await
                    .context("Failed to check category name")?
                    .is_some()
                {
                    return Err(CategoryServiceError::DuplicateName(name));
                }
            }
            category.name = name;
        }

        let updated = self
            .repo
            .update(&category)
            .await
            .context("Failed to update category")?;

        Ok(updated)
    }

    /// Soft-delete a category
    ///
    /// # Errors
    ///
    /// - `NotFound` if the category does not exist
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCategoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> CategoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        CategoryService::new(SqlxCategoryRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_category() {
        let service = setup_service().await;

        let created = service
            .create(CreateCategoryInput {
                name: " Technology ".to_string(),
            })
            .await
            .expect("Failed to create category");

        assert_eq!(created.name, "Technology");
    }

    #[tokio::test]
    async fn test_create_empty_name_rejected() {
        let service = setup_service().await;

        let result = service
            .create(CreateCategoryInput {
                name: "".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(CategoryServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_name_rejected() {
        let service = setup_service().await;

        service
            .create(CreateCategoryInput {
                name: "General".to_string(),
            })
            .await
            .expect("Failed to create category");

        let result = service
            .create(CreateCategoryInput {
                name: "General".to_string(),
            })
            .await;

        assert!(matches!(
            result,
            Err(CategoryServiceError::DuplicateName(name)) if name == "General"
        ));
    }

    #[tokio::test]
    async fn test_name_reusable_after_delete() {
        let service = setup_service().await;

        let first = service
            .create(CreateCategoryInput {
                name: "General".to_string(),
            })
            .await
            .expect("Failed to create category");
        service.delete(first.id).await.expect("Failed to delete");

        // Only non-deleted categories hold their name
        let second = service
            .create(CreateCategoryInput {
                name: "General".to_string(),
            })
            .await
            .expect("Name should be free after soft delete");
        assert_ne!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_update_to_existing_name_rejected() {
        let service = setup_service().await;

        service
            .create(CreateCategoryInput {
                name: "News".to_string(),
            })
            .await
            .expect("Failed to create category");
        let other = service
            .create(CreateCategoryInput {
                name: "Tech".to_string(),
            })
            .await
            .expect("Failed to create category");

        let result = service
            .update(
                other.id,
                UpdateCategoryInput {
                    name: Some("News".to_string()),
                },
            )
            .await;
        assert!(matches!(result, Err(CategoryServiceError::DuplicateName(_))));

        // Re-submitting the current name is not a collision
        let unchanged = service
            .update(
                other.id,
                UpdateCategoryInput {
                    name: Some("Tech".to_string()),
                },
            )
            .await
            .expect("Same name should be accepted");
        assert_eq!(unchanged.name, "Tech");
    }

    #[tokio::test]
    async fn test_update_category() {
        let service = setup_service().await;
        let created = service
            .create(CreateCategoryInput {
                name: "Tech".to_string(),
            })
            .await
            .expect("Failed to create category");

        let updated = service
            .update(
                created.id,
                UpdateCategoryInput {
                    name: Some("Technology".to_string()),
                },
            )
            .await
            .expect("Failed to update category");

        assert_eq!(updated.name, "Technology");
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let service = setup_service().await;

        let result = service
            .update(
                999,
                UpdateCategoryInput {
                    name: Some("Ghost".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(CategoryServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_category() {
        let service = setup_service().await;
        let created = service
            .create(CreateCategoryInput {
                name: "Ephemeral".to_string(),
            })
            .await
            .expect("Failed to create category");

        service.delete(created.id).await.expect("Failed to delete");
        assert!(service.get_by_id(created.id).await.unwrap().is_none());

        let result = service.delete(created.id).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_categories_paged() {
        let service = setup_service().await;
        for name in ["Alpha", "Beta", "Gamma"] {
            service
                .create(CreateCategoryInput {
                    name: name.to_string(),
                })
                .await
                .expect("Failed to create category");
        }

        let page = service
            .list(&ListParams::new(1, 2))
            .await
            .expect("Failed to list");

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next());
    }
}
