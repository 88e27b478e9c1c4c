//! Services layer - Business logic
//!
//! This module contains all business logic services for the Blogr system.
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod article;
pub mod category;
pub mod comment;
pub mod password;
pub mod role;
pub mod token;
pub mod user;

pub use article::{ArticleService, ArticleServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use password::{hash_password, verify_password};
pub use role::{RoleService, RoleServiceError};
pub use token::{Claims, TokenError, TokenService};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
