//! Collection routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::posts::PostSummary;
use pinboard_db::entities::collections;
use pinboard_db::{CollectionRepository, PostRepository};

/// Creates the public collection routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/collections/{collection_id}/posts", get(collection_posts))
}

/// Creates the collection routes that require a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me/collections", get(my_collections))
        .route("/collections", post(create_collection))
}

/// Collection projection.
#[derive(Debug, Serialize)]
pub struct CollectionInfo {
    /// Collection ID.
    pub id: i64,
    /// Collection name.
    pub name: String,
    /// Collection description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning user ID.
    pub user_id: i64,
}

impl From<collections::Model> for CollectionInfo {
    fn from(c: collections::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            created_at: c.created_at.with_timezone(&Utc),
            user_id: c.user_id,
        }
    }
}

/// Request body for creating a collection.
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    /// Collection name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/collections/{collection_id}/posts - Posts saved into a
/// collection, newest post first.
async fn collection_posts(
    State(state): State<AppState>,
    Path(collection_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = CollectionRepository::new((*state.db).clone())
        .find_by_id(collection_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Collection {collection_id} not found")))?;

    let posts = PostRepository::new((*state.db).clone())
        .list_by_collection(collection_id)
        .await?;
    let posts: Vec<PostSummary> = posts.into_iter().map(PostSummary::from).collect();

    Ok(Json(json!({
        "collection": CollectionInfo::from(collection),
        "posts": posts,
    })))
}

/// GET /api/me/collections - The caller's collections.
async fn my_collections(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let collections = CollectionRepository::new((*state.db).clone())
        .list_by_user(auth.user_id())
        .await?;
    let collections: Vec<CollectionInfo> =
        collections.into_iter().map(CollectionInfo::from).collect();

    Ok(Json(json!({ "collections": collections })))
}

/// POST /api/collections - Create a named collection.
async fn create_collection(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(ApiError::validation("Collection name must be 1-100 characters"));
    }

    let collection = CollectionRepository::new((*state.db).clone())
        .create(auth.user_id(), name, payload.description.as_deref())
        .await?;

    info!(
        user_id = auth.user_id(),
        collection_id = collection.id,
        "collection created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "collection": CollectionInfo::from(collection) })),
    ))
}
