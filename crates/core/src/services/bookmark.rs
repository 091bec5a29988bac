//! Bookmark service.

use tsocial_common::AppResult;
use tsocial_db::repositories::{BookmarkRepository, PostRepository};

/// Bookmark service for saving posts.
#[derive(Clone)]
pub struct BookmarkService {
    bookmark_repo: BookmarkRepository,
    post_repo: PostRepository,
}

impl BookmarkService {
    /// Create a new bookmark service.
    #[must_use]
    pub const fn new(bookmark_repo: BookmarkRepository, post_repo: PostRepository) -> Self {
        Self {
            bookmark_repo,
            post_repo,
        }
    }

    /// Bookmark or un-bookmark a post. Returns whether it is now bookmarked.
    pub async fn toggle(&self, user_id: i64, post_id: i64) -> AppResult<bool> {
        self.post_repo.get_by_id(post_id).await?;
        self.bookmark_repo.toggle(user_id, post_id).await
    }

    /// Check if a post is bookmarked by the user.
    pub async fn is_bookmarked(&self, user_id: i64, post_id: i64) -> AppResult<bool> {
        Ok(self.bookmark_repo.find(user_id, post_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use tsocial_common::AppError;
    use tsocial_db::entities::{bookmark, post};

    fn service(db: MockDatabase) -> BookmarkService {
        let db = Arc::new(db.into_connection());
        BookmarkService::new(
            BookmarkRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
        )
    }

    fn target() -> post::Model {
        post::Model {
            id: 7,
            user_id: 2,
            content: "save me".to_string(),
            image: None,
            parent_id: None,
            likes_count: 0,
            replies_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn saved() -> bookmark::Model {
        bookmark::Model {
            id: 3,
            user_id: 1,
            post_id: 7,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_toggle_missing_post() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
        );

        assert!(matches!(
            svc.toggle(1, 7).await,
            Err(AppError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_removes_existing() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target()]])
                .append_query_results([[saved()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
        );

        assert!(!svc.toggle(1, 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_bookmarked() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[saved()]]),
        );

        assert!(svc.is_bookmarked(1, 7).await.unwrap());
    }
}
