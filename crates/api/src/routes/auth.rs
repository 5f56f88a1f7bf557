//! Authentication routes: register, login, logout, current user.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::USER_AGENT},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{AuthUser, auth::SESSION_COOKIE};
use crate::AppState;
use pinboard_core::auth::{hash_password, validate_password, verify_password};
use pinboard_db::{SessionRepository, UserRepository};
use pinboard_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Creates the auth routes that require a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn user_info(user: pinboard_db::entities::users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username,
        email: user.email,
        bio: user.bio,
        profile_image_url: user.profile_image_url,
        created_at: user.created_at.with_timezone(&chrono::Utc),
    }
}

/// POST /api/auth/register - Create an account.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    validate_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;

    let user = UserRepository::new((*state.db).clone())
        .create(&payload.username, &payload.email, &password_hash)
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user_info(user) })),
    ))
}

/// POST /api/auth/login - Authenticate and start a session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = user_repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            info!(email = %payload.email, "login attempt for unknown email");
            ApiError::unauthorized("Invalid email or password")
        })?;

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = user.id, "failed login attempt");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
        Err(e) => {
            error!(error = %e, "password verification error");
            return Err(ApiError::internal("An error occurred during login"));
        }
    }

    let session_id = Uuid::new_v4();
    let expires_at = state.jwt.session_expiry();
    let token = state
        .jwt
        .generate_session_token(user.id, session_id, expires_at)
        .map_err(|e| {
            error!(error = %e, "failed to generate session token");
            ApiError::internal("An error occurred during login")
        })?;

    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    SessionRepository::new((*state.db).clone())
        .create(session_id, user.id, &token, expires_at, user_agent, None)
        .await?;

    info!(user_id = user.id, session_id = %session_id, "user logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: user_info(user),
            token,
            expires_in: state.jwt.session_lifetime_secs(),
        }),
    ))
}

/// POST /api/auth/logout - Destroy the current session.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    SessionRepository::new((*state.db).clone())
        .revoke(auth.session_id())
        .await?;

    info!(user_id = auth.user_id(), session_id = %auth.session_id(), "user logged out");

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();

    Ok((jar.remove(removal), Json(json!({ "success": true }))))
}

/// GET /api/auth/me - Current user projection.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(json!({ "user": user_info(user) })))
}
