//! Post service: feed, replies, search and per-viewer hydration.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tsocial_common::{AppError, AppResult};
use tsocial_db::{
    entities::{post, user},
    repositories::{BookmarkRepository, PostLikeRepository, PostRepository, UserRepository},
};
use validator::Validate;

/// Explore shows this many posts when no query is given.
pub const EXPLORE_RECENT_LIMIT: u64 = 20;

/// Trending tags are counted over this many of the newest posts.
pub const TRENDING_WINDOW: u64 = 200;

/// Number of trending tags returned.
pub const TRENDING_LIMIT: usize = 5;

/// Input for creating a post or reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 500))]
    #[serde(default)]
    pub content: String,

    pub image: Option<String>,

    #[serde(alias = "parent_id")]
    pub parent_id: Option<i64>,
}

/// A post with its author and the viewer's relation to it.
#[derive(Debug, Clone)]
pub struct HydratedPost {
    pub post: post::Model,
    pub author: user::Model,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

/// A hashtag and how often it appears in the trending window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingTag {
    pub tag: String,
    pub count: u64,
}

/// Result of the explore page.
#[derive(Debug, Clone)]
pub struct Explore {
    pub posts: Vec<HydratedPost>,
    pub trending: Vec<TrendingTag>,
}

/// Count `#tags` in `contents`, most frequent first.
///
/// Tags are letters, digits and underscores after `#`, compared case-insensitively.
/// The first spelling seen is the one reported.
#[must_use]
pub fn trending_tags<'a, I>(contents: I, limit: usize) -> Vec<TrendingTag>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, (String, u64)> = HashMap::new();

    for content in contents {
        let mut chars = content.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            if c != '#' {
                continue;
            }
            let mut end = start + 1;
            while let Some(&(i, next)) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            if end > start + 1 {
                let tag = &content[start..end];
                counts
                    .entry(tag.to_lowercase())
                    .or_insert_with(|| (tag.to_string(), 0))
                    .1 += 1;
            }
        }
    }

    let mut tags: Vec<TrendingTag> = counts
        .into_values()
        .map(|(tag, count)| TrendingTag { tag, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags.truncate(limit);
    tags
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    like_repo: PostLikeRepository,
    bookmark_repo: BookmarkRepository,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        like_repo: PostLikeRepository,
        bookmark_repo: BookmarkRepository,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            like_repo,
            bookmark_repo,
        }
    }

    /// Attach authors and the viewer's like/bookmark flags, keeping order.
    pub async fn hydrate(
        &self,
        posts: Vec<post::Model>,
        viewer_id: Option<i64>,
    ) -> AppResult<Vec<HydratedPost>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<i64, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let (liked, bookmarked) = match viewer_id {
            Some(viewer) => (
                self.like_repo.find_liked_among(viewer, &post_ids).await?,
                self.bookmark_repo
                    .find_bookmarked_among(viewer, &post_ids)
                    .await?,
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let author = authors.get(&post.user_id)?.clone();
                Some(HydratedPost {
                    is_liked: liked.contains(&post.id),
                    is_bookmarked: bookmarked.contains(&post.id),
                    post,
                    author,
                })
            })
            .collect())
    }

    /// Load posts by ID in the given order, skipping any that are gone.
    async fn in_order(&self, ids: &[i64]) -> AppResult<Vec<post::Model>> {
        let mut found: HashMap<i64, post::Model> = self
            .post_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    /// Every post, newest first.
    pub async fn feed(&self, viewer_id: Option<i64>) -> AppResult<Vec<HydratedPost>> {
        let posts = self.post_repo.find_feed().await?;
        self.hydrate(posts, viewer_id).await
    }

    /// Create a post or, with `parent_id`, a reply.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<HydratedPost> {
        input.validate()?;

        let content = input.content.trim().to_string();
        let image = input.image.filter(|i| !i.trim().is_empty());
        if content.is_empty() && image.is_none() {
            return Err(AppError::BadRequest(
                "Post must have content or an image".to_string(),
            ));
        }

        if let Some(parent_id) = input.parent_id {
            self.post_repo.get_by_id(parent_id).await?;
        }

        let model = post::ActiveModel {
            user_id: Set(author.id),
            content: Set(content),
            image: Set(image),
            parent_id: Set(input.parent_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;

        Ok(HydratedPost {
            post,
            author: author.clone(),
            is_liked: false,
            is_bookmarked: false,
        })
    }

    /// Replies to a post, oldest first.
    pub async fn replies(
        &self,
        post_id: i64,
        viewer_id: Option<i64>,
    ) -> AppResult<Vec<HydratedPost>> {
        self.post_repo.get_by_id(post_id).await?;
        let posts = self.post_repo.find_replies(post_id).await?;
        self.hydrate(posts, viewer_id).await
    }

    /// Posts liked by `handle`, most recently liked first.
    pub async fn liked_by(
        &self,
        handle: &str,
        viewer_id: Option<i64>,
    ) -> AppResult<Vec<HydratedPost>> {
        let owner = self.user_repo.get_by_handle(handle).await?;
        let ids = self.like_repo.find_post_ids_by_user(owner.id).await?;
        let posts = self.in_order(&ids).await?;
        self.hydrate(posts, viewer_id).await
    }

    /// Replies authored by `handle`, newest first.
    pub async fn replies_by(
        &self,
        handle: &str,
        viewer_id: Option<i64>,
    ) -> AppResult<Vec<HydratedPost>> {
        let owner = self.user_repo.get_by_handle(handle).await?;
        let posts = self.post_repo.find_replies_by_user(owner.id).await?;
        self.hydrate(posts, viewer_id).await
    }

    /// The viewer's bookmarks, most recently bookmarked first.
    pub async fn bookmarks(&self, viewer_id: i64) -> AppResult<Vec<HydratedPost>> {
        let ids = self.bookmark_repo.find_post_ids_by_user(viewer_id).await?;
        let posts = self.in_order(&ids).await?;
        self.hydrate(posts, Some(viewer_id)).await
    }

    /// Search results, or the newest posts, plus trending tags.
    pub async fn explore(
        &self,
        query: Option<&str>,
        viewer_id: Option<i64>,
    ) -> AppResult<Explore> {
        let posts = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => self.post_repo.search(q).await?,
            None => self.post_repo.find_recent(EXPLORE_RECENT_LIMIT).await?,
        };

        let window = self.post_repo.find_recent(TRENDING_WINDOW).await?;
        let trending = trending_tags(window.iter().map(|p| p.content.as_str()), TRENDING_LIMIT);

        Ok(Explore {
            posts: self.hydrate(posts, viewer_id).await?,
            trending,
        })
    }
}
