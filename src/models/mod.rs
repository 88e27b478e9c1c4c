//! Data models
//!
//! This module contains all data structures used throughout the Blogr system.
//! Models represent:
//! - Database entities (User, Role, Article, Category, Comment)
//! - Input types for create/update operations
//! - Pagination helpers shared by the list queries

mod article;
mod category;
mod comment;
mod role;
mod user;

pub use article::{Article, CreateArticleInput, ListParams, PagedResult, UpdateArticleInput};
pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CreateCommentInput, UpdateCommentInput};
pub use role::{CreateRoleInput, Role, UpdateRoleInput, ROLE_ADMIN, ROLE_USER};
pub use user::{UpdateUserInput, User};
