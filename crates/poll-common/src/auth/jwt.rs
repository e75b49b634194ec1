//! JWT utilities for admin authentication
//!
//! The credential itself is checked by the record store; this service only
//! mints and validates the signed admin token handed out after a successful
//! login, using the `jsonwebtoken` crate.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims for the admin token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (admin username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Marker distinguishing admin tokens from anything else signed with
    /// the same secret
    pub is_admin: bool,
}

impl AdminClaims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT service for encoding and decoding admin tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and expiry in seconds
    #[must_use]
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    /// Issue an admin token for a verified login
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_admin_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
            is_admin: true,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate an admin token
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or not an admin
    /// token
    pub fn validate_admin_token(&self, token: &str) -> Result<AdminClaims, AppError> {
        let token_data = decode::<AdminClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        if !token_data.claims.is_admin {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}
