//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tsocial_common::AppResult;
use tsocial_core::CreatePostInput;

use crate::{
    extractors::{AppJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, PostResponse},
};

/// Every post, newest first.
async fn feed(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state.post_service.feed(viewer.id()).await?;
    Ok(Json(response::posts(posts)))
}

/// Create a post or reply.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreatePostInput>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let created = state.post_service.create(&user, req).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replies to a post, oldest first.
async fn replies(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state.post_service.replies(id, viewer.id()).await?;
    Ok(Json(response::posts(posts)))
}

/// Like toggle response.
#[derive(Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LikeResponse>> {
    let liked = state.like_service.toggle(user.id, id).await?;
    Ok(Json(LikeResponse {
        success: true,
        liked,
    }))
}

/// Bookmark toggle response.
#[derive(Serialize)]
pub struct BookmarkResponse {
    pub success: bool,
    pub bookmarked: bool,
}

async fn bookmark(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookmarkResponse>> {
    let bookmarked = state.bookmark_service.toggle(user.id, id).await?;
    Ok(Json(BookmarkResponse {
        success: true,
        bookmarked,
    }))
}

pub fn public() -> Router<AppState> {
    Router::new()
        .route("/posts", get(feed))
        .route("/posts/{id}/replies", get(replies))
}

pub fn protected() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create))
        .route("/posts/{id}/like", post(like))
        .route("/posts/{id}/bookmark", post(bookmark))
}
