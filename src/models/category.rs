//! Category model
//!
//! This module defines the Category entity and related types for the Blogr system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity for organizing articles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category with the given name.
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
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    /// Category name
    pub name: String,
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    /// New name (optional)
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new("Technology".to_string());
        assert_eq!(category.id, 0);
        assert_eq!(category.name, "Technology");
    }
}
