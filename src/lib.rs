//! Blogr - A blog publishing backend
//!
//! This library provides the core functionality for the Blogr API server.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
