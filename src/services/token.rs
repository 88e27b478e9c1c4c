//! Token service
//!
//! Issues and verifies the two JWTs used for authentication:
//! - Access tokens: short-lived (minutes), carried in the Authorization header
//! - Refresh tokens: long-lived (days), carried in an HTTP-only cookie
//!
//! The two token kinds are signed with separate secrets, so an access token
//! can never be replayed as a refresh token or vice versa. Verification uses
//! zero leeway: a token is rejected the moment its expiry passes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID
    pub sub: i64,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

/// Error types for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Token is malformed or has an invalid signature
    #[error("Invalid token")]
    Invalid,

    /// Token could not be created
    #[error("Failed to create token: {0}")]
    Creation(String),
}

/// Service for issuing and verifying access and refresh tokens
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_ttls(
            &config.access_token_secret,
            &config.refresh_token_secret,
            Duration::minutes(config.access_token_ttl_minutes),
            Duration::days(config.refresh_token_ttl_days),
        )
    }

    /// Create a token service with explicit lifetimes
    pub fn with_ttls(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Refresh token lifetime in whole seconds (used for the cookie Max-Age)
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    /// Issue a new access token for the given user
    pub fn issue_access_token(&self, user_id: i64) -> Result<String, TokenError> {
        issue(user_id, self.access_ttl, &self.access_encoding)
    }

    /// Issue a new refresh token for the given user
    pub fn issue_refresh_token(&self, user_id: i64) -> Result<String, TokenError> {
        issue(user_id, self.refresh_ttl, &self.refresh_encoding)
    }

    /// Verify an access token and return the user ID it was issued for
    pub fn verify_access_token(&self, token: &str) -> Result<i64, TokenError> {
        verify(token, &self.access_decoding)
    }

    /// Verify a refresh token and return the user ID it was issued for
    pub fn verify_refresh_token(&self, token: &str) -> Result<i64, TokenError> {
        verify(token, &self.refresh_decoding)
    }
}

fn issue(user_id: i64, ttl: Duration, key: &EncodingKey) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, key)
        .map_err(|e| TokenError::Creation(e.to_string()))
}

fn verify(token: &str, key: &DecodingKey) -> Result<i64, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Ok(data.claims.sub)
}
