//! HTTP API layer for tsocial.
//!
//! - **Endpoints**: auth, posts, profiles, bookmarks, explore, messages, admin
//! - **Middleware**: the authentication gate and shared [`middleware::AppState`]
//! - **Extractors**: the authenticated viewer and JSON request bodies
//! - **Response**: JSON views of accounts, posts and messages
//!
//! Built on Axum 0.8. Every route is relative; the server nests them under `/api`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
