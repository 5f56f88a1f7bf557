//! Save repository: the post/collection relationship model.
//!
//! Each `(post, collection)` pair has an independent join-record lifecycle.
//! Saving targets exactly one collection (the default one when none is
//! given); unsaving without a target removes the post from every collection
//! the user owns. That asymmetry is deliberate product behavior.

use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};

use crate::entities::{collections, posts, saves};
use crate::repositories::CollectionRepository;

/// Error types for save operations.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Post not found.
    #[error("post not found: {0}")]
    PostNotFound(i64),

    /// Target collection not found.
    #[error("collection not found: {0}")]
    CollectionNotFound(i64),

    /// Target collection belongs to another user.
    #[error("collection belongs to another user")]
    NotOwner,

    /// The post is already saved to this collection.
    #[error("post already saved to this collection")]
    AlreadySaved,

    /// No save matched the removal criteria.
    #[error("post not saved to specified collection")]
    NotSaved,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for save/unsave operations and save lookups.
#[derive(Debug, Clone)]
pub struct SaveRepository {
    db: DatabaseConnection,
}

impl SaveRepository {
    /// Creates a new save repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves a post into one of the user's collections.
    ///
    /// With no `collection_id` the user's default `Saved` collection is the
    /// target, created on the spot if absent. The whole flow (bootstrap,
    /// ownership check, duplicate check, insert) runs in one transaction.
    ///
    /// # Errors
    ///
    /// - `PostNotFound` if the post does not exist
    /// - `CollectionNotFound` / `NotOwner` for a bad explicit target
    /// - `AlreadySaved` if the `(post, collection)` pair exists; the unique
    ///   constraint makes this hold even under concurrent saves
    pub async fn save_post(
        &self,
        user_id: i64,
        post_id: i64,
        collection_id: Option<i64>,
    ) -> Result<saves::Model, SaveError> {
        let txn = self.db.begin().await?;

        posts::Entity::find_by_id(post_id)
            .one(&txn)
            .await?
            .ok_or(SaveError::PostNotFound(post_id))?;

        let collection = match collection_id {
            Some(id) => {
                let collection = collections::Entity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or(SaveError::CollectionNotFound(id))?;
                if collection.user_id != user_id {
                    return Err(SaveError::NotOwner);
                }
                collection
            }
            None => CollectionRepository::ensure_default_on(&txn, user_id).await?,
        };

        let existing = saves::Entity::find()
            .filter(saves::Column::PostId.eq(post_id))
            .filter(saves::Column::CollectionId.eq(collection.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(SaveError::AlreadySaved);
        }

        let save = saves::ActiveModel {
            post_id: Set(post_id),
            collection_id: Set(collection.id),
            saved_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // backstop for a save racing past the duplicate check
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                SaveError::AlreadySaved
            } else {
                SaveError::Database(e)
            }
        })?;

        txn.commit().await?;
        Ok(save)
    }

    /// Removes saves for a post.
    ///
    /// With a `collection_id`, removes only the save in that collection
    /// after validating ownership. Without one, removes the post from EVERY
    /// collection the user owns in a single statement.
    ///
    /// Returns the number of removed saves.
    ///
    /// # Errors
    ///
    /// - `CollectionNotFound` / `NotOwner` for a bad explicit target
    /// - `NotSaved` if nothing matched the removal criteria
    pub async fn unsave_post(
        &self,
        user_id: i64,
        post_id: i64,
        collection_id: Option<i64>,
    ) -> Result<u64, SaveError> {
        let delete = saves::Entity::delete_many().filter(saves::Column::PostId.eq(post_id));

        let delete = match collection_id {
            Some(id) => {
                let collection = collections::Entity::find_by_id(id)
                    .one(&self.db)
                    .await?
                    .ok_or(SaveError::CollectionNotFound(id))?;
                if collection.user_id != user_id {
                    return Err(SaveError::NotOwner);
                }
                delete.filter(saves::Column::CollectionId.eq(id))
            }
            None => delete.filter(
                saves::Column::CollectionId.in_subquery(
                    Query::select()
                        .column(collections::Column::Id)
                        .from(collections::Entity)
                        .and_where(Expr::col(collections::Column::UserId).eq(user_id))
                        .to_owned(),
                ),
            ),
        };

        let result = delete.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(SaveError::NotSaved);
        }
        Ok(result.rows_affected)
    }

    /// True iff any save for this post sits in one of the user's
    /// collections, default or otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_saved_by_user(&self, user_id: i64, post_id: i64) -> Result<bool, DbErr> {
        let count = saves::Entity::find()
            .filter(saves::Column::PostId.eq(post_id))
            .join(JoinType::InnerJoin, saves::Relation::Collections.def())
            .filter(collections::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Total saves referencing a post, across all users and collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn save_count(&self, post_id: i64) -> Result<u64, DbErr> {
        saves::Entity::find()
            .filter(saves::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
    }
}
