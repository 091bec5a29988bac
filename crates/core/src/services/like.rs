//! Like service.

use tsocial_common::AppResult;
use tsocial_db::repositories::{PostLikeRepository, PostRepository};

/// Like service for toggling likes on posts.
#[derive(Clone)]
pub struct LikeService {
    like_repo: PostLikeRepository,
    post_repo: PostRepository,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: PostLikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
        }
    }

    /// Like or unlike a post. Returns whether the post is now liked.
    pub async fn toggle(&self, user_id: i64, post_id: i64) -> AppResult<bool> {
        self.post_repo.get_by_id(post_id).await?;
        self.like_repo.toggle(user_id, post_id).await
    }
}
