//! Session token generation and validation.
//!
//! Session tokens are HS256 JWTs carrying the caller's [`Identity`] in the
//! `user` claim. They are never stored server-side, so validity is purely a
//! matter of the signature and the `exp` claim.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::auth::Identity;

/// Session token duration: 15 minutes
pub const SESSION_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Claims written into every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// The authenticated identity
    pub user: Identity,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims as read back during verification. `user` is kept untyped so a
/// payload with the wrong shape can be told apart from a bad signature.
#[derive(Debug, Deserialize)]
struct RawSessionClaims {
    #[serde(default)]
    user: serde_json::Value,
}

/// Result of issuing a session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
}

/// Signing configuration for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a session token for an identity, valid for 15 minutes.
    pub fn issue(&self, identity: &Identity) -> Result<SessionToken, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = SessionClaims {
            sub: identity.id.to_string(),
            user: identity.clone(),
            iat: now,
            exp: now + SESSION_TOKEN_DURATION_SECS,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(SessionToken {
            token,
            duration: SESSION_TOKEN_DURATION_SECS,
        })
    }

    /// Verify a session token and return the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<RawSessionClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::InvalidToken)?;

        serde_json::from_value(token_data.claims.user).map_err(JwtError::MalformedClaims)
    }
}

/// Errors that can occur during session token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed
    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    /// Bad signature, broken structure, or expired
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    /// Verified token whose `user` claim is missing or not an identity
    #[error("malformed token claims: {0}")]
    MalformedClaims(#[source] serde_json::Error),
    #[error("system time error")]
    TimeError,
}
