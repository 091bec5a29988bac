//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, User, post, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, Func},
};
use tsocial_common::{AppError, AppResult};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs (unordered).
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a post and bump the counters it affects.
    ///
    /// The insert, the parent's `replies_count` and the author's
    /// `posts_count` are written in one transaction.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(parent_id) = created.parent_id {
            Post::update_many()
                .col_expr(
                    post::Column::RepliesCount,
                    Expr::col(post::Column::RepliesCount).add(1),
                )
                .filter(post::Column::Id.eq(parent_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        User::update_many()
            .col_expr(
                user::Column::PostsCount,
                Expr::col(user::Column::PostsCount).add(1),
            )
            .filter(user::Column::Id.eq(created.user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Every post, newest first.
    pub async fn find_feed(&self) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The newest `limit` posts.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replies to a post, oldest first.
    pub async fn find_replies(&self, parent_id: i64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::ParentId.eq(parent_id))
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replies written by a user, newest first.
    pub async fn find_replies_by_user(&self, user_id: i64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .filter(post::Column::ParentId.is_not_null())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over content, newest first.
    pub async fn search(&self, query: &str) -> AppResult<Vec<post::Model>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        Post::find()
            .filter(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(pattern))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts created at or after `since`.
    pub async fn count_since(
        &self,
        since: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_post(id: i64, user_id: i64, parent_id: Option<i64>) -> post::Model {
        post::Model {
            id,
            user_id,
            content: "hello #rust".to_string(),
            image: None,
            parent_id,
            likes_count: 0,
            replies_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        match repo.get_by_id(5).await {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "5"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_create_reply_bumps_parent_and_author() {
        let reply = create_test_post(2, 1, Some(1));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reply.clone()]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        let model = post::ActiveModel {
            user_id: Set(1),
            content: Set("hello #rust".to_string()),
            parent_id: Set(Some(1)),
            ..Default::default()
        };
        let created = repo.create(model).await.unwrap();
        assert_eq!(created.parent_id, Some(1));

        let db = Arc::try_unwrap(db).unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("replies_count"));
        assert!(log.contains("posts_count"));
    }

    #[tokio::test]
    async fn test_create_top_level_skips_parent_update() {
        let created = create_test_post(3, 1, None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .append_exec_results([exec_ok()])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        let model = post::ActiveModel {
            user_id: Set(1),
            content: Set("hello #rust".to_string()),
            ..Default::default()
        };
        repo.create(model).await.unwrap();

        let db = Arc::try_unwrap(db).unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches("UPDATE").count(), 1);
    }

    #[tokio::test]
    async fn test_find_replies() {
        let replies = vec![create_test_post(2, 1, Some(1)), create_test_post(3, 2, Some(1))];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([replies])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_replies(1).await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.parent_id == Some(1)));
    }
}
