//! Bookmark list endpoint.

use axum::{Json, Router, extract::State, routing::get};
use tsocial_common::AppResult;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, PostResponse},
};

/// The viewer's bookmarked posts, most recently saved first.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state.post_service.bookmarks(user.id).await?;
    Ok(Json(response::posts(posts)))
}

pub fn protected() -> Router<AppState> {
    Router::new().route("/bookmarks", get(list))
}
