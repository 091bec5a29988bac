//! Post like repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Post, PostLike, post, post_like};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tsocial_common::{AppError, AppResult};

/// Repository for post likes.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Like the post if not yet liked, otherwise remove the like.
    ///
    /// Keeps `posts.likes_count` in step within the same transaction and
    /// never lets it drop below zero. Returns whether the post is now liked.
    pub async fn toggle(&self, user_id: i64, post_id: i64) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = PostLike::find()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let liked = if let Some(like) = existing {
            PostLike::delete_by_id(like.id)
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            Post::update_many()
                .col_expr(
                    post::Column::LikesCount,
                    Expr::cust("GREATEST(likes_count - 1, 0)"),
                )
                .filter(post::Column::Id.eq(post_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            false
        } else {
            post_like::ActiveModel {
                user_id: Set(user_id),
                post_id: Set(post_id),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

            Post::update_many()
                .col_expr(
                    post::Column::LikesCount,
                    Expr::col(post::Column::LikesCount).add(1),
                )
                .filter(post::Column::Id.eq(post_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            true
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(liked)
    }

    /// Which of `post_ids` the user has liked.
    pub async fn find_liked_among(
        &self,
        user_id: i64,
        post_ids: &[i64],
    ) -> AppResult<HashSet<i64>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Posts the user has liked, most recently liked first.
    pub async fn find_post_ids_by_user(&self, user_id: i64) -> AppResult<Vec<i64>> {
        PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .order_by_desc(post_like::Column::CreatedAt)
            .order_by_desc(post_like::Column::Id)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
