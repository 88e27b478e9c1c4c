//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.
//!
//! Deletion is always a soft delete: rows are flagged with `deleted = TRUE`
//! and a `deleted_at` timestamp, and every read in this module filters
//! flagged rows out. Nothing above this layer ever sees a deleted row.

pub mod article;
pub mod category;
pub mod comment;
pub mod role;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use role::{RoleRepository, SqlxRoleRepository};
pub use user::{SqlxUserRepository, UserRepository};
