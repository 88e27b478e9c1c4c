//! Article model
//!
//! This module provides:
//! - `Article` entity representing a blog article
//! - Input types for creating and updating articles
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub body: String,
    /// Author user ID
    pub author_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Whether the article is visible to anonymous readers
    pub published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Create a new article with the given parameters
    pub fn new(
        title: String,
        body: String,
        author_id: i64,
        category_id: i64,
        published: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by database
            title,
            body,
            author_id,
            category_id,
            published,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Article title
    pub title: String,
    /// Article body
    pub body: String,
    /// Author user ID
    pub author_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Whether to publish immediately (defaults to false)
    #[serde(default)]
    pub published: bool,
}

/// Input for updating an existing article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New body (optional)
    pub body: Option<String>,
    /// New category ID (optional)
    pub category_id: Option<i64>,
    /// New published flag (optional)
    pub published: Option<bool>,
}

impl UpdateArticleInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.body.is_some()
            || self.category_id.is_some()
            || self.published.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let per_page = self.per_page as i64;
        ((self.total + per_page - 1) / per_page) as u32
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_new() {
        let article = Article::new("Title".to_string(), "Body".to_string(), 1, 2, false);
        assert_eq!(article.id, 0);
        assert_eq!(article.author_id, 1);
        assert_eq!(article.category_id, 2);
        assert!(!article.published);
    }

    #[test]
    fn test_update_input_has_changes() {
        let empty = UpdateArticleInput::default();
        assert!(!empty.has_changes());

        let update = UpdateArticleInput {
            published: Some(true),
            ..Default::default()
        };
        assert!(update.has_changes());
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);

        let params = ListParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_total_pages_with_large_totals() {
        let params = ListParams::new(1, 100);
        let result = PagedResult::<i64>::new(Vec::new(), 5_000_000_000, &params);

        // Must not wrap through u32 while dividing
        assert_eq!(result.total_pages(), 50_000_000);
    }

    #[test]
    fn test_paged_result() {
        let params = ListParams::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);

        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());
        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// For any raw input, normalized parameters stay within bounds
            /// and the offset never points before the first row.
            #[test]
            fn list_params_always_in_bounds(page in any::<u32>(), per_page in any::<u32>()) {
                let params = ListParams::new(page, per_page);

                prop_assert!(params.page >= 1);
                prop_assert!((1..=100).contains(&params.per_page));
                prop_assert!(params.offset() >= 0);
                prop_assert_eq!(
                    params.offset(),
                    (params.page as i64 - 1) * params.per_page as i64
                );
            }

            /// total_pages is always enough to hold every item.
            #[test]
            fn total_pages_covers_total(total in 0i64..100_000, per_page in 1u32..=100) {
                let params = ListParams::new(1, per_page);
                let result = PagedResult::<i64>::new(Vec::new(), total, &params);

                let capacity = result.total_pages() as i64 * per_page as i64;
                prop_assert!(capacity >= total);
                prop_assert!(capacity - total < per_page as i64);
            }
        }
    }
}
