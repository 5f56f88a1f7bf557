//! Save and unsave routes.
//!
//! Saving targets one collection (the default `Saved` collection when the
//! body names none); unsaving with no target removes the post from every
//! collection the caller owns. The asymmetry is intentional.

use axum::{Json, Router, extract::Path, extract::State, response::IntoResponse, routing::post};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use pinboard_db::SaveRepository;

/// Creates the save routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/save/{post_id}", post(save_post))
        .route("/unsave/{post_id}", post(unsave_post))
}

/// Request body for save/unsave.
#[derive(Debug, Default, Deserialize)]
pub struct SaveBody {
    /// Explicit target collection; defaults to the user's `Saved`
    /// collection for saves and to "everywhere" for unsaves.
    pub collection_id: Option<i64>,
}

/// Clients routinely POST these endpoints with no body at all; treat an
/// empty body as `{}` and reject only malformed JSON.
fn parse_body(body: &Bytes) -> Result<SaveBody, ApiError> {
    if body.is_empty() {
        return Ok(SaveBody::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("Malformed JSON body: {e}")))
}

/// POST /api/save/{post_id} - Save a post into a collection.
async fn save_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let collection_id = parse_body(&body)?.collection_id;

    let save = SaveRepository::new((*state.db).clone())
        .save_post(auth.user_id(), post_id, collection_id)
        .await?;

    info!(
        user_id = auth.user_id(),
        post_id,
        collection_id = save.collection_id,
        "post saved"
    );

    Ok(Json(json!({ "success": true })))
}

/// POST /api/unsave/{post_id} - Remove saves for a post.
async fn unsave_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let collection_id = parse_body(&body)?.collection_id;

    let removed = SaveRepository::new((*state.db).clone())
        .unsave_post(auth.user_id(), post_id, collection_id)
        .await?;

    info!(user_id = auth.user_id(), post_id, removed, "post unsaved");

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_default() {
        let body = parse_body(&Bytes::new()).expect("empty body accepted");
        assert_eq!(body.collection_id, None);
    }

    #[test]
    fn test_explicit_collection_id() {
        let body = parse_body(&Bytes::from_static(br#"{"collection_id": 7}"#))
            .expect("valid body accepted");
        assert_eq!(body.collection_id, Some(7));
    }

    #[test]
    fn test_null_and_missing_collection_id() {
        let body = parse_body(&Bytes::from_static(br#"{"collection_id": null}"#))
            .expect("null accepted");
        assert_eq!(body.collection_id, None);

        let body = parse_body(&Bytes::from_static(b"{}")).expect("empty object accepted");
        assert_eq!(body.collection_id, None);
    }

    #[test]
    fn test_malformed_body_rejected() {
        assert!(parse_body(&Bytes::from_static(b"not json")).is_err());
    }
}
