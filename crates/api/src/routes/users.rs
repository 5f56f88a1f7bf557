//! User profile routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::collections::CollectionInfo;
use crate::routes::posts::PostSummary;
use pinboard_db::{CollectionRepository, PostRepository, UserRepository};

/// Creates the public user routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/{username}", get(profile))
}

/// GET /api/users/{username} - Public profile with posts and collections.
async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{username}' not found")))?;

    let posts = PostRepository::new((*state.db).clone())
        .list_by_user(user.id)
        .await?;
    let posts: Vec<PostSummary> = posts.into_iter().map(PostSummary::from).collect();

    let collections = CollectionRepository::new((*state.db).clone())
        .list_by_user(user.id)
        .await?;
    let collections: Vec<CollectionInfo> =
        collections.into_iter().map(CollectionInfo::from).collect();

    Ok(Json(json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "bio": user.bio,
            "profile_image_url": user.profile_image_url,
            "created_at": user.created_at,
        },
        "posts": posts,
        "collections": collections,
    })))
}
