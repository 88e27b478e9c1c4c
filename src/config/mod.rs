//! Configuration management
//!
//! This module handles loading and parsing configuration for the Blogr API
//! server. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. Token signing
//! secrets and database credentials are expected to come from environment
//! variables in production deployments.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication / token configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based refresh tokens)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/blogr.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Authentication configuration
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// access secret cannot be used to mint refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Secret used to sign refresh tokens
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Access token lifetime in minutes
    #[serde(default = "default_access_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            access_token_ttl_minutes: default_access_ttl_minutes(),
            refresh_token_ttl_days: default_refresh_ttl_days(),
        }
    }
}

fn default_access_secret() -> String {
    "change-me-access".to_string()
}

fn default_refresh_secret() -> String {
    "change-me-refresh".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    5
}

fn default_refresh_ttl_days() -> i64 {
    7
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - BLOGR_SERVER_HOST
    /// - BLOGR_SERVER_PORT
    /// - BLOGR_SERVER_CORS_ORIGIN
    /// - BLOGR_DATABASE_DRIVER
    /// - BLOGR_DATABASE_URL
    /// - BLOGR_AUTH_ACCESS_TOKEN_SECRET
    /// - BLOGR_AUTH_REFRESH_TOKEN_SECRET
    /// - BLOGR_AUTH_ACCESS_TOKEN_TTL_MINUTES
    /// - BLOGR_AUTH_REFRESH_TOKEN_TTL_DAYS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("BLOGR_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BLOGR_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("BLOGR_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        // Database configuration
        if let Ok(driver) = std::env::var("BLOGR_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("BLOGR_DATABASE_URL") {
            self.database.url = url;
        }

        // Auth configuration
        if let Ok(secret) = std::env::var("BLOGR_AUTH_ACCESS_TOKEN_SECRET") {
            self.auth.access_token_secret = secret;
        }
        if let Ok(secret) = std::env::var("BLOGR_AUTH_REFRESH_TOKEN_SECRET") {
            self.auth.refresh_token_secret = secret;
        }
        if let Ok(ttl) = std::env::var("BLOGR_AUTH_ACCESS_TOKEN_TTL_MINUTES") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.access_token_ttl_minutes = ttl;
            }
        }
        if let Ok(ttl) = std::env::var("BLOGR_AUTH_REFRESH_TOKEN_TTL_DAYS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.refresh_token_ttl_days = ttl;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.driver, DatabaseDriver::Sqlite);
        assert_eq!(config.auth.access_token_ttl_minutes, 5);
        assert_eq!(config.auth.refresh_token_ttl_days, 7);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(std::path::Path::new("definitely/not/here.yml"))
            .expect("Missing file should yield defaults");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "   \n").expect("Failed to write");

        let config = Config::load(file.path()).expect("Empty file should yield defaults");
        assert_eq!(config.database.url, "data/blogr.db");
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            "server:\n  port: 9000\nauth:\n  access_token_ttl_minutes: 15\n"
        )
        .expect("Failed to write");

        let config = Config::load(file.path()).expect("Failed to load config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.access_token_ttl_minutes, 15);
        // Unspecified values fall back to defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.refresh_token_ttl_days, 7);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "server: [not a map").expect("Failed to write");

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_database_driver_parsing() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            "database:\n  driver: mysql\n  url: mysql://root@localhost/blogr\n"
        )
        .expect("Failed to write");

        let config = Config::load(file.path()).expect("Failed to load config");
        assert_eq!(config.database.driver, DatabaseDriver::Mysql);
        assert_eq!(config.database.url, "mysql://root@localhost/blogr");
    }
}
