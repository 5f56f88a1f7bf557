//! User repository for database operations.

use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::entities::users;
use crate::repositories::CollectionRepository;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Username is already taken.
    #[error("username already taken")]
    UsernameTaken,

    /// Email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Registers a new user.
    ///
    /// The user row and their default `Saved` collection are inserted in one
    /// transaction; a failure in either leaves no trace of the registration.
    ///
    /// # Errors
    ///
    /// Returns `UsernameTaken`/`EmailTaken` for identity conflicts; no row
    /// is written in that case.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<users::Model, UserError> {
        let txn = self.db.begin().await?;

        let exists = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&txn)
            .await?;
        if exists > 0 {
            return Err(UserError::UsernameTaken);
        }

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&txn)
            .await?;
        if exists > 0 {
            return Err(UserError::EmailTaken);
        }

        let user = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            bio: Set(None),
            profile_image_url: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            // backstop for registrations racing past the pre-checks
            Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email") => {
                UserError::EmailTaken
            }
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::UsernameTaken,
            _ => UserError::Database(e),
        })?;

        CollectionRepository::ensure_default_on(&txn, user.id).await?;

        txn.commit().await?;
        Ok(user)
    }

    /// Searches usernames by case-insensitive substring match.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_by_username(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(Expr::col(users::Column::Username).ilike(format!("%{query}%")))
            .limit(limit)
            .all(&self.db)
            .await
    }
}
