//! Session token generation and validation.
//!
//! Session identity is a signed JWT carried in an HttpOnly cookie (or a
//! Bearer header for API clients), backed by a server-side sessions row.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Session token expiration in hours.
    pub session_expires_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            session_expires_hours: 24 * 14,
        }
    }
}

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is invalid.
    #[error("invalid token")]
    Invalid,
}

/// Session token service.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new token service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Returns when a token issued now would expire.
    #[must_use]
    pub fn session_expiry(&self) -> DateTime<Utc> {
        Utc::now() + Duration::hours(self.config.session_expires_hours)
    }

    /// Returns the configured session lifetime in seconds.
    #[must_use]
    pub const fn session_lifetime_secs(&self) -> i64 {
        self.config.session_expires_hours * 3600
    }

    /// Generates a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_session_token(
        &self,
        user_id: i64,
        session_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, session_id, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a session token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for expired tokens and `JwtError::Invalid`
    /// for anything else that fails signature or shape checks.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            session_expires_hours: 1,
        })
    }

    #[test]
    fn test_token_roundtrip() {
        let svc = service();
        let sid = Uuid::new_v4();
        let expires_at = svc.session_expiry();

        let token = svc
            .generate_session_token(42, sid, expires_at)
            .expect("token should encode");
        let claims = svc.validate_token(&token).expect("token should validate");

        assert_eq!(claims.user_id(), 42);
        assert_eq!(claims.session_id(), sid);
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let expires_at = Utc::now() - Duration::hours(2);

        let token = svc
            .generate_session_token(1, Uuid::new_v4(), expires_at)
            .expect("token should encode");

        assert!(matches!(svc.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = JwtService::new(JwtConfig {
            secret: "different-secret".to_string(),
            session_expires_hours: 1,
        });

        let token = svc
            .generate_session_token(1, Uuid::new_v4(), svc.session_expiry())
            .expect("token should encode");

        assert!(matches!(other.validate_token(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().validate_token("not.a.token"),
            Err(JwtError::Invalid)
        ));
    }
}
