//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a filed suspension appeal. `NULL` means no appeal was filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    /// Waiting for an administrator.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Refused. No further appeal is accepted for this suspension.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AppealStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique, immutable, case-sensitive
    #[sea_orm(unique)]
    pub handle: String,

    /// Display name
    pub name: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub banner_url: Option<String>,

    /// Posts count (denormalized)
    #[sea_orm(default_value = 0)]
    pub posts_count: i32,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = false)]
    pub is_suspended: bool,

    /// Present only while suspended
    #[sea_orm(column_type = "Text", nullable)]
    pub suspension_reason: Option<String>,

    /// Handle of the suspending administrator
    #[sea_orm(nullable)]
    pub suspended_by: Option<String>,

    #[sea_orm(nullable)]
    pub appeal_status: Option<AppealStatus>,

    #[sea_orm(column_type = "Text", nullable)]
    pub appeal_text: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub last_active_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
