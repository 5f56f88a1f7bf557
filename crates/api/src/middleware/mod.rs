//! Request middleware.

pub mod auth;

pub use auth::{AuthUser, OptionalAuthUser, auth_middleware, optional_auth_middleware};
