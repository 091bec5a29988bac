//! Profile endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use tsocial_common::{AppError, AppResult};
use tsocial_core::UpdateProfileInput;

use crate::{
    extractors::{AppJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ActionResponse, PostResponse, ProfileResponse},
};

/// `?handle=` query.
#[derive(Debug, Deserialize)]
pub struct HandleQuery {
    pub handle: Option<String>,
}

impl HandleQuery {
    fn require(&self) -> AppResult<&str> {
        self.handle
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::BadRequest("Handle required".to_string()))
    }
}

/// Someone's profile, or the viewer's own when no handle is given.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<HandleQuery>,
) -> AppResult<Json<ProfileResponse>> {
    let account = match (query.handle.as_deref().filter(|h| !h.is_empty()), viewer.0) {
        (Some(handle), _) => state.user_service.get_by_handle(handle).await?,
        (None, Some(me)) => me,
        (None, None) => return Err(AppError::BadRequest("Handle required".to_string())),
    };

    Ok(Json(account.into()))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateProfileInput>,
) -> AppResult<Json<ActionResponse>> {
    state.user_service.update_profile(user.id, req).await?;
    Ok(Json(ActionResponse::ok("Profile updated")))
}

async fn likes(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<HandleQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .liked_by(query.require()?, viewer.id())
        .await?;
    Ok(Json(response::posts(posts)))
}

async fn replies(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<HandleQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .replies_by(query.require()?, viewer.id())
        .await?;
    Ok(Json(response::posts(posts)))
}

pub fn public() -> Router<AppState> {
    Router::new()
        .route("/profile", get(show))
        .route("/profile/likes", get(likes))
        .route("/profile/replies", get(replies))
}

pub fn protected() -> Router<AppState> {
    Router::new().route("/profile", put(update))
}
