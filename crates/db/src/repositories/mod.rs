//! Repositories wrapping the shared connection pool.

mod bookmark;
mod message;
mod post;
mod post_like;
mod user;

pub use bookmark::BookmarkRepository;
pub use message::MessageRepository;
pub use post::PostRepository;
pub use post_like::PostLikeRepository;
pub use user::UserRepository;
