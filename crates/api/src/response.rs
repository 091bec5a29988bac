//! API response types.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tsocial_core::{HydratedPost, PlatformStats, TrendingTag};
use tsocial_db::entities::{message, user};

fn rfc3339(t: DateTime<FixedOffset>) -> String {
    t.to_rfc3339()
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    /// A successful acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Post engagement counters.
#[derive(Debug, Serialize)]
pub struct PostStats {
    pub likes: i32,
    pub comments: i32,
    pub reposts: i32,
    pub views: i32,
}

/// A post as the client renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub user_id: i64,
    /// Author display name.
    pub username: String,
    pub handle: String,
    pub avatar: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub is_liked: bool,
    pub is_bookmarked: bool,
    pub stats: PostStats,
}

impl From<HydratedPost> for PostResponse {
    fn from(hydrated: HydratedPost) -> Self {
        let HydratedPost {
            post,
            author,
            is_liked,
            is_bookmarked,
        } = hydrated;

        Self {
            id: post.id,
            user_id: post.user_id,
            username: author.name,
            handle: author.handle,
            avatar: author.avatar_url,
            content: post.content,
            image: post.image,
            parent_id: post.parent_id,
            created_at: rfc3339(post.created_at),
            is_liked,
            is_bookmarked,
            stats: PostStats {
                likes: post.likes_count,
                comments: post.replies_count,
                reposts: 0,
                views: 0,
            },
        }
    }
}

/// Convert a hydrated list.
pub fn posts(list: Vec<HydratedPost>) -> Vec<PostResponse> {
    list.into_iter().map(PostResponse::from).collect()
}

/// Public profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub posts_count: i32,
    pub is_admin: bool,
    pub join_date: String,
    pub last_active_at: Option<String>,
}

impl From<user::Model> for ProfileResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            handle: user.handle,
            bio: user.bio,
            location: user.location,
            website: user.website,
            avatar: user.avatar_url,
            banner: user.banner_url,
            posts_count: user.posts_count,
            is_admin: user.is_admin,
            join_date: rfc3339(user.created_at),
            last_active_at: user.last_active_at.map(rfc3339),
        }
    }
}

/// A conversation partner in the inbox list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub avatar: Option<String>,
    pub last_active_at: Option<String>,
}

impl From<user::Model> for ConversationResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            handle: user.handle,
            avatar: user.avatar_url,
            last_active_at: user.last_active_at.map(rfc3339),
        }
    }
}

/// A direct message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: String,
}

impl From<message::Model> for MessageResponse {
    fn from(message: message::Model) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            created_at: rfc3339(message.created_at),
        }
    }
}

/// A trending hashtag.
#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub id: usize,
    pub tag: String,
    pub count: u64,
}

/// Trending tags ranked from 1.
pub fn trending(tags: Vec<TrendingTag>) -> Vec<TrendingResponse> {
    tags.into_iter()
        .enumerate()
        .map(|(i, t)| TrendingResponse {
            id: i + 1,
            tag: t.tag,
            count: t.count,
        })
        .collect()
}

/// Explore page payload.
#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    pub posts: Vec<PostResponse>,
    pub trending: Vec<TrendingResponse>,
}

/// Admin view of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub posts_count: i32,
    pub is_admin: bool,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub appeal_status: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for AdminUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            handle: user.handle,
            posts_count: user.posts_count,
            is_admin: user.is_admin,
            is_suspended: user.is_suspended,
            suspension_reason: user.suspension_reason,
            appeal_status: user.appeal_status.map(|s| s.as_str().to_string()),
            created_at: rfc3339(user.created_at),
        }
    }
}

/// A pending appeal awaiting review.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealResponse {
    pub id: i64,
    pub name: String,
    pub handle: String,
    pub appeal_status: Option<String>,
    pub appeal_text: Option<String>,
    pub suspension_reason: Option<String>,
    pub suspended_by: Option<String>,
}

impl From<user::Model> for AppealResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            handle: user.handle,
            appeal_status: user.appeal_status.map(|s| s.as_str().to_string()),
            appeal_text: user.appeal_text,
            suspension_reason: user.suspension_reason,
            suspended_by: user.suspended_by,
        }
    }
}

/// Admin dashboard totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_posts: u64,
    pub posts_today: u64,
}

impl From<PlatformStats> for StatsResponse {
    fn from(stats: PlatformStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_posts: stats.total_posts,
            posts_today: stats.posts_today,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::Utc;
    use tsocial_db::entities::{AppealStatus, post};

    fn account() -> user::Model {
        user::Model {
            id: 4,
            handle: "alice".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            bio: Some("hi".to_string()),
            location: None,
            website: None,
            avatar_url: Some("https://img/a.png".to_string()),
            banner_url: None,
            posts_count: 3,
            is_admin: false,
            is_suspended: true,
            suspension_reason: Some("spam".to_string()),
            suspended_by: Some("tsocial".to_string()),
            appeal_status: Some(AppealStatus::Pending),
            appeal_text: Some("please reconsider".to_string()),
            created_at: Utc::now().into(),
            last_active_at: None,
        }
    }

    #[test]
    fn test_post_response_shape() {
        let hydrated = HydratedPost {
            post: post::Model {
                id: 9,
                user_id: 4,
                content: "hello".to_string(),
                image: None,
                parent_id: Some(2),
                likes_count: 5,
                replies_count: 1,
                created_at: Utc::now().into(),
            },
            author: account(),
            is_liked: true,
            is_bookmarked: false,
        };

        let json = serde_json::to_value(PostResponse::from(hydrated)).unwrap();
        assert_eq!(json["username"], "Alice");
        assert_eq!(json["handle"], "alice");
        assert_eq!(json["parentId"], 2);
        assert_eq!(json["isLiked"], true);
        assert_eq!(json["stats"]["likes"], 5);
        assert_eq!(json["stats"]["comments"], 1);
    }

    #[test]
    fn test_admin_user_response_hides_credentials() {
        let json = serde_json::to_value(AdminUserResponse::from(account())).unwrap();
        assert_eq!(json["appealStatus"], "pending");
        assert_eq!(json["isSuspended"], true);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_trending_ranks_from_one() {
        let ranked = trending(vec![
            TrendingTag {
                tag: "#rust".to_string(),
                count: 4,
            },
            TrendingTag {
                tag: "#axum".to_string(),
                count: 2,
            },
        ]);
        assert_eq!(ranked[0].id, 1);
        assert_eq!(ranked[1].id, 2);
        assert_eq!(ranked[1].tag, "#axum");
    }
}
