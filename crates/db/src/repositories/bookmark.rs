//! Bookmark repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Bookmark, bookmark};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tsocial_common::{AppError, AppResult};

/// Repository for bookmarks.
#[derive(Clone)]
pub struct BookmarkRepository {
    db: Arc<DatabaseConnection>,
}

impl BookmarkRepository {
    /// Create a new bookmark repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the bookmark row for a user and post.
    pub async fn find(&self, user_id: i64, post_id: i64) -> AppResult<Option<bookmark::Model>> {
        Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add or remove the bookmark. Returns whether the post is now bookmarked.
    pub async fn toggle(&self, user_id: i64, post_id: i64) -> AppResult<bool> {
        if let Some(existing) = self.find(user_id, post_id).await? {
            Bookmark::delete_by_id(existing.id)
                .exec(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        bookmark::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Which of `post_ids` the user has bookmarked.
    pub async fn find_bookmarked_among(
        &self,
        user_id: i64,
        post_ids: &[i64],
    ) -> AppResult<HashSet<i64>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = Bookmark::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.is_in(post_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Bookmarked post IDs, most recently bookmarked first.
    pub async fn find_post_ids_by_user(&self, user_id: i64) -> AppResult<Vec<i64>> {
        Bookmark::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .order_by_desc(bookmark::Column::Id)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
