//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Author
    pub user_id: i64,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Image URL or data URI
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,

    /// Set when this post is a reply
    #[sea_orm(nullable)]
    pub parent_id: Option<i64>,

    /// Likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    /// Replies count (denormalized)
    #[sea_orm(default_value = 0)]
    pub replies_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
