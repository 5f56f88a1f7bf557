//! Session authentication middleware.
//!
//! Identity arrives either as the session cookie set at login or as an
//! `Authorization: Bearer` header. The token is a signed JWT whose `sid`
//! claim names a server-side sessions row; the row must still be live, so
//! logout takes effect immediately rather than at token expiry.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::AppState;
use crate::error::ApiError;
use pinboard_db::SessionRepository;
use pinboard_shared::JwtError;
use pinboard_shared::auth::Claims;

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "pinboard_session";

/// Pulls a session token from the Authorization header or the session
/// cookie, in that order.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())
        && let Some(token) = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

async fn resolve_claims(state: &AppState, token: &str) -> Result<Claims, ApiError> {
    let claims = state.jwt.validate_token(token).map_err(|e| match e {
        JwtError::Expired => ApiError::unauthorized("Session has expired"),
        _ => ApiError::unauthorized("Invalid session token"),
    })?;

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.find_live(claims.session_id(), token).await {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(ApiError::unauthorized("Session is no longer valid")),
        Err(e) => {
            error!(error = %e, "database error validating session");
            Err(ApiError::internal("An error occurred validating the session"))
        }
    }
}

/// Authentication middleware for protected routes: a missing or dead
/// session is a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = token_from_headers(request.headers()) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    match resolve_claims(&state, &token).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Authentication middleware for public routes that personalize their
/// responses: a valid session attaches an identity, anything else is
/// silently anonymous.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = token_from_headers(request.headers())
        && let Ok(claims) = resolve_claims(&state, &token).await
    {
        request.extensions_mut().insert(claims);
    }

    next.run(request).await
}

/// Extractor for the authenticated user.
///
/// Rejects with 401 when no identity was attached by the middleware.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.0.user_id()
    }

    /// Returns the session ID from the claims.
    #[must_use]
    pub const fn session_id(&self) -> uuid::Uuid {
        self.0.session_id()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Extractor for an optional identity on public routes.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<Claims>);

impl OptionalAuthUser {
    /// Returns the user ID, if an identity is attached.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(Claims::user_id)
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Claims>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_cookie_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("pinboard_session=tok123; other=1"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("pinboard_session=from-cookie"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
