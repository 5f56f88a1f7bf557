//! Collection repository for database operations.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::entities::collections;

/// Name of the distinguished collection every user implicitly owns.
pub const DEFAULT_COLLECTION_NAME: &str = "Saved";
/// Description given to the default collection when it is created.
pub const DEFAULT_COLLECTION_DESCRIPTION: &str = "Your saved pins";

/// Error types for collection operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// Collection not found.
    #[error("collection not found: {0}")]
    NotFound(i64),

    /// The user already owns a collection with this name.
    #[error("collection name '{0}' already in use")]
    NameTaken(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Collection repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    db: DatabaseConnection,
}

impl CollectionRepository {
    /// Creates a new collection repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the user's default `Saved` collection, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure_default(&self, user_id: i64) -> Result<collections::Model, DbErr> {
        Self::ensure_default_on(&self.db, user_id).await
    }

    /// `ensure_default` against an arbitrary connection, so registration can
    /// run it inside its transaction and the save path can run it inside its
    /// own. Both call sites share this exact code path.
    ///
    /// Uses `INSERT .. ON CONFLICT DO NOTHING` plus a re-select: a raised
    /// unique violation would abort an enclosing Postgres transaction, ON
    /// CONFLICT does not. Two racing callers both end up with the single
    /// surviving row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ensure_default_on<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<collections::Model, DbErr> {
        if let Some(existing) = Self::find_default(conn, user_id).await? {
            return Ok(existing);
        }

        tracing::debug!(user_id, "bootstrapping default collection");

        let model = collections::ActiveModel {
            name: Set(DEFAULT_COLLECTION_NAME.to_string()),
            description: Set(Some(DEFAULT_COLLECTION_DESCRIPTION.to_string())),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        collections::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([collections::Column::UserId, collections::Column::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Self::find_default(conn, user_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("default collection after insert".to_string()))
    }

    async fn find_default<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<Option<collections::Model>, DbErr> {
        collections::Entity::find()
            .filter(collections::Column::UserId.eq(user_id))
            .filter(collections::Column::Name.eq(DEFAULT_COLLECTION_NAME))
            .one(conn)
            .await
    }

    /// Finds a collection by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<collections::Model>, DbErr> {
        collections::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all collections owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<collections::Model>, DbErr> {
        collections::Entity::find()
            .filter(collections::Column::UserId.eq(user_id))
            .order_by_asc(collections::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Creates a named collection for a user.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::NameTaken` if the user already owns a
    /// collection with this name.
    pub async fn create(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<collections::Model, CollectionError> {
        let model = collections::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(String::from)),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                CollectionError::NameTaken(name.to_string())
            } else {
                CollectionError::Database(e)
            }
        })
    }
}
