//! `SeaORM` Entity for the posts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: String,
    /// `image` or `video`, derived from the upload's extension.
    pub file_type: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub user_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::saves::Entity")]
    Saves,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::saves::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saves.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
