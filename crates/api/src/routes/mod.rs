//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth_middleware, optional_auth_middleware},
};

pub mod auth;
pub mod collections;
pub mod health;
pub mod posts;
pub mod saves;
pub mod users;

/// Creates the `/api` router.
///
/// Three tiers: plain public routes, public routes that personalize when a
/// session is present, and protected routes behind the strict auth
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(saves::routes())
        .merge(collections::protected_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let personalized = Router::new()
        .merge(posts::routes())
        .layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ));

    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(collections::routes())
        .merge(personalized)
        .merge(protected)
}
