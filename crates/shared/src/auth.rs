//! Authentication DTOs and session token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Claims carried by a session token.
///
/// The token embeds the user id (`sub`) and the server-side session id
/// (`sid`) so that revoking the session row invalidates the token before
/// its natural expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: i64,
    /// Session ID backing this token.
    pub sid: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user session.
    #[must_use]
    pub fn new(user_id: i64, session_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            sid: session_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.sub
    }

    /// Returns the session ID from claims.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.sid
    }
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,
    /// User email.
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    /// User password. Length policy lives with the hashing code, not here.
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Public user projection.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Profile bio.
    pub bio: Option<String>,
    /// Profile image URL.
    pub profile_image_url: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Session token (also set as an HttpOnly cookie).
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_accessors() {
        let sid = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);
        let claims = Claims::new(7, sid, expires_at);

        assert_eq!(claims.user_id(), 7);
        assert_eq!(claims.session_id(), sid);
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "password123".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "password123".into(),
        };
        assert!(bad_email.validate().is_err());

        let short_username = RegisterRequest {
            username: "ab".into(),
            email: "ab@x.com".into(),
            password: "password123".into(),
        };
        assert!(short_username.validate().is_err());
    }
}
