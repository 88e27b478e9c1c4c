//! Comment model
//!
//! This module defines the Comment entity and related types for the Blogr system.
//! Comments belong to an article and a registered user; anonymous commenting
//! is not supported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Article this comment belongs to
    pub article_id: i64,
    /// User who wrote the comment
    pub user_id: i64,
    /// Comment content
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new Comment with the given parameters
    pub fn new(article_id: i64, user_id: i64, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            article_id,
            user_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    /// Article the comment belongs to
    pub article_id: i64,
    /// Author of the comment
    pub user_id: i64,
    /// Comment content
    pub content: String,
}

/// Input for updating a comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommentInput {
    /// New content (optional)
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_new() {
        let comment = Comment::new(1, 2, "Nice article".to_string());
        assert_eq!(comment.id, 0);
        assert_eq!(comment.article_id, 1);
        assert_eq!(comment.user_id, 2);
        assert_eq!(comment.content, "Nice article");
    }
}
