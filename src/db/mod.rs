//! Database layer
//!
//! This module provides database abstraction for the Blogr API server.
//! It supports:
//! - SQLite (default, for single-binary deployment and tests)
//! - MySQL (for larger deployments)
//!
//! The database driver is selected based on configuration. Repositories are
//! written against the `DatabasePool` trait so the application never needs to
//! know which backend it is talking to.
//!
//! Soft deletion is enforced at this layer: every read filters
//! `deleted = FALSE`, and deletes flip the `deleted`/`deleted_at` pair
//! instead of removing rows.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
