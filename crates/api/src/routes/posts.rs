//! Post routes: feed, detail, search, upload, and deletion.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::{AuthUser, OptionalAuthUser, auth_middleware};
use pinboard_core::media;
use pinboard_db::entities::posts;
use pinboard_db::repositories::CreatePostInput;
use pinboard_db::{PostRepository, SaveRepository, UserRepository};
use pinboard_shared::types::{PageRequest, PageResponse};

/// Upload request bodies may exceed the axum default limit; cap them a bit
/// above the largest accepted file instead.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Creates the public post routes (mounted behind the optional-auth layer
/// so responses can personalize).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/post/{post_id}", get(get_post).delete(delete_post))
        .route("/search", get(search))
        .route("/uploads/status", get(uploads_status))
}

/// Creates the root-level upload route with its own auth layer and a
/// raised body limit.
#[allow(clippy::needless_pass_by_value)]
pub fn upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

// ============================================================================
// Response Types
// ============================================================================

/// Author block embedded in post projections.
#[derive(Debug, Serialize)]
pub struct AuthorInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Profile image URL.
    pub profile_image_url: Option<String>,
}

/// Post projection for lists.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    /// Post ID.
    pub id: i64,
    /// Title.
    pub title: Option<String>,
    /// Stored file reference.
    pub file_url: String,
    /// `image` or `video`.
    pub file_type: String,
    /// Optional thumbnail reference.
    pub thumbnail_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning user ID.
    pub user_id: i64,
}

impl From<posts::Model> for PostSummary {
    fn from(post: posts::Model) -> Self {
        Self {
            id: post.id,
            title: post.title,
            file_url: post.file_url,
            file_type: post.file_type,
            thumbnail_url: post.thumbnail_url,
            created_at: post.created_at.with_timezone(&Utc),
            user_id: post.user_id,
        }
    }
}

/// Full post projection for the detail endpoint.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    /// Post ID.
    pub id: i64,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Stored file reference.
    pub file_url: String,
    /// `image` or `video`.
    pub file_type: String,
    /// Optional thumbnail reference.
    pub thumbnail_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Author block.
    pub author: AuthorInfo,
    /// Total saves across all users.
    pub save_count: u64,
    /// Whether the current identity has saved this post anywhere.
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/posts - Paginated feed, newest first.
async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (posts, total) = PostRepository::new((*state.db).clone())
        .list_recent(&page)
        .await?;

    let data: Vec<PostSummary> = posts.into_iter().map(PostSummary::from).collect();
    Ok(Json(PageResponse::new(data, page.page, page.per_page, total)))
}

/// GET /api/post/{post_id} - Post projection with save state.
async fn get_post(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = PostRepository::new((*state.db).clone())
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} not found")))?;

    let author = UserRepository::new((*state.db).clone())
        .find_by_id(post.user_id)
        .await?
        .ok_or_else(|| ApiError::internal("post author missing"))?;

    let saves = SaveRepository::new((*state.db).clone());
    let save_count = saves.save_count(post_id).await?;
    let saved = match auth.user_id() {
        Some(user_id) => saves.is_saved_by_user(user_id, post_id).await?,
        None => false,
    };

    Ok(Json(PostDetail {
        id: post.id,
        title: post.title,
        description: post.description,
        file_url: post.file_url,
        file_type: post.file_type,
        thumbnail_url: post.thumbnail_url,
        created_at: post.created_at.with_timezone(&Utc),
        author: AuthorInfo {
            id: author.id,
            username: author.username,
            profile_image_url: author.profile_image_url,
        },
        save_count,
        saved,
    }))
}

/// GET /api/search?q= - Posts by title/description, users by username.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::validation("Search query must not be empty"));
    }

    let posts = PostRepository::new((*state.db).clone()).search(q, 50).await?;
    let users = UserRepository::new((*state.db).clone())
        .search_by_username(q, 20)
        .await?;

    let posts: Vec<PostSummary> = posts.into_iter().map(PostSummary::from).collect();
    let users: Vec<AuthorInfo> = users
        .into_iter()
        .map(|u| AuthorInfo {
            id: u.id,
            username: u.username,
            profile_image_url: u.profile_image_url,
        })
        .collect();

    Ok(Json(json!({ "query": q, "posts": posts, "users": users })))
}

/// GET /api/uploads/status - Whether the upload feature is available.
///
/// Clients use this to disable the upload UI when the storage backend is
/// unconfigured.
async fn uploads_status(State(state): State<AppState>) -> impl IntoResponse {
    let max_file_size = state.storage.as_ref().map(|s| s.max_file_size());

    Json(json!({
        "enabled": state.storage.is_some(),
        "max_file_size": max_file_size,
    }))
}

/// POST /upload - Multipart upload creating a post.
///
/// Fields: `file` (required), `title`, `description`.
async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let Some(storage) = state.storage.clone() else {
        return Err(ApiError::uploads_disabled());
    };

    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut file: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("Malformed multipart body: {e}"))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("Malformed multipart body: {e}"))
                })?);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| ApiError::validation("No selected file"))?;
                let data = field.bytes().await.map_err(|e| {
                    ApiError::validation(format!("Failed to read upload: {e}"))
                })?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let Some((filename, data)) = file else {
        return Err(ApiError::validation("No file part"));
    };
    if data.is_empty() {
        return Err(ApiError::validation("No selected file"));
    }
    if !media::is_allowed_file(&filename) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "file_type_not_allowed",
            "File type not allowed",
        ));
    }

    let stored = storage.store(data, &filename, Uuid::new_v4()).await?;

    let post = PostRepository::new((*state.db).clone())
        .create(CreatePostInput {
            title: title.filter(|t| !t.is_empty()),
            description: description.filter(|d| !d.is_empty()),
            file_url: stored.url,
            file_type: stored.kind.as_str().to_string(),
            thumbnail_url: None,
            user_id: auth.user_id(),
        })
        .await?;

    info!(post_id = post.id, user_id = auth.user_id(), "post created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "post": PostSummary::from(post) })),
    ))
}

/// DELETE /api/post/{post_id} - Remove an owned post.
///
/// Saves cascade at the schema level; the backing blob is removed
/// best-effort, with failures logged rather than surfaced.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PostRepository::new((*state.db).clone());

    let post = repo
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {post_id} not found")))?;

    if post.user_id != auth.user_id() {
        return Err(ApiError::forbidden("Unauthorized"));
    }

    repo.delete(post_id).await?;
    info!(post_id, user_id = auth.user_id(), "post deleted");

    if let Some(storage) = &state.storage
        && let Err(e) = storage.remove(&post.file_url).await
    {
        warn!(post_id, error = %e, "failed to remove backing blob");
    }

    Ok(Json(json!({ "success": true })))
}
