//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod auth;
pub mod bookmark;
pub mod like;
pub mod messaging;
pub mod moderation;
pub mod post;
pub mod user;

pub use admin::{AdminService, PlatformStats};
pub use auth::{Claims, TokenService, hash_password, verify_password};
pub use bookmark::BookmarkService;
pub use like::LikeService;
pub use messaging::{MESSAGE_MAX_CHARS, MessagingService, SendMessageInput};
pub use moderation::{
    APPEAL_MAX_CHARS, APPEAL_MIN_CHARS, AppealDecision, DEFAULT_SUSPENSION_REASON,
    ModerationEvent, ModerationService, ModerationState, SYSTEM_HANDLE,
};
pub use post::{CreatePostInput, Explore, HydratedPost, PostService, TrendingTag, trending_tags};
pub use user::{RegisterInput, Session, UpdateProfileInput, UserService};
