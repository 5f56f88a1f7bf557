//! Post repository for database operations.

use pinboard_shared::types::PageRequest;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{posts, saves};

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title.
    pub title: Option<String>,
    /// Post description.
    pub description: Option<String>,
    /// Durable storage reference for the uploaded file.
    pub file_url: String,
    /// `image` or `video`.
    pub file_type: String,
    /// Optional thumbnail reference.
    pub thumbnail_url: Option<String>,
    /// Owning user.
    pub user_id: i64,
}

/// Post repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Creates a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreatePostInput) -> Result<posts::Model, DbErr> {
        posts::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            file_url: Set(input.file_url),
            file_type: Set(input.file_type),
            thumbnail_url: Set(input.thumbnail_url),
            created_at: Set(chrono::Utc::now().into()),
            user_id: Set(input.user_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Finds a post by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<posts::Model>, DbErr> {
        posts::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists posts newest-first with offset pagination.
    ///
    /// Returns the page of posts and the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, page: &PageRequest) -> Result<(Vec<posts::Model>, u64), DbErr> {
        let total = posts::Entity::find().count(&self.db).await?;

        let items = posts::Entity::find()
            .order_by_desc(posts::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Lists a user's posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<posts::Model>, DbErr> {
        posts::Entity::find()
            .filter(posts::Column::UserId.eq(user_id))
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Lists the posts saved into a collection, newest post first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_collection(&self, collection_id: i64) -> Result<Vec<posts::Model>, DbErr> {
        posts::Entity::find()
            .join(JoinType::InnerJoin, posts::Relation::Saves.def())
            .filter(saves::Column::CollectionId.eq(collection_id))
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Searches posts by case-insensitive substring match on title or
    /// description, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(&self, query: &str, limit: u64) -> Result<Vec<posts::Model>, DbErr> {
        let pattern = format!("%{query}%");

        posts::Entity::find()
            .filter(
                Condition::any()
                    .add(Expr::col(posts::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(posts::Column::Description).ilike(pattern)),
            )
            .order_by_desc(posts::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Deletes a post by ID. Saves cascade at the schema level.
    ///
    /// Returns true if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: i64) -> Result<bool, DbErr> {
        let result = posts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
