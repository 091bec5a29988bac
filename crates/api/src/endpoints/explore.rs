//! Explore and search endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tsocial_common::AppResult;

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{self, ExploreResponse},
};

/// Explore query.
#[derive(Debug, Deserialize)]
pub struct ExploreQuery {
    pub q: Option<String>,
}

async fn explore(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> AppResult<Json<ExploreResponse>> {
    let explore = state
        .post_service
        .explore(query.q.as_deref(), viewer.id())
        .await?;

    Ok(Json(ExploreResponse {
        posts: response::posts(explore.posts),
        trending: response::trending(explore.trending),
    }))
}

pub fn public() -> Router<AppState> {
    Router::new().route("/explore", get(explore))
}
