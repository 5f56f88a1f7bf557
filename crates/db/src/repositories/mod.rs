//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod collection;
pub mod post;
pub mod save;
pub mod session;
pub mod user;

pub use collection::{
    CollectionError, CollectionRepository, DEFAULT_COLLECTION_DESCRIPTION, DEFAULT_COLLECTION_NAME,
};
pub use post::{CreatePostInput, PostRepository};
pub use save::{SaveError, SaveRepository};
pub use session::SessionRepository;
pub use user::{UserError, UserRepository};
