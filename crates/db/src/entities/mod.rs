//! Database entities.

pub mod bookmark;
pub mod message;
pub mod post;
pub mod post_like;
pub mod user;

pub use bookmark::Entity as Bookmark;
pub use message::Entity as Message;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use user::{AppealStatus, Entity as User};
