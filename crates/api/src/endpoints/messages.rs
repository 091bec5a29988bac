//! Direct message endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tsocial_common::AppResult;
use tsocial_core::SendMessageInput;

use crate::{
    extractors::{AppJson, AuthUser},
    middleware::AppState,
    response::{ConversationResponse, MessageResponse},
};

/// Everyone the viewer has exchanged messages with.
async fn conversations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ConversationResponse>>> {
    let partners = state.messaging_service.conversations(user.id).await?;
    Ok(Json(partners.into_iter().map(Into::into).collect()))
}

/// Full history with one user, oldest first.
async fn history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<Vec<MessageResponse>>> {
    let messages = state.messaging_service.history(user.id, &handle).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

async fn send(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<SendMessageInput>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let message = state.messaging_service.send(&user, req).await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

pub fn protected() -> Router<AppState> {
    Router::new()
        .route("/messages", get(conversations).post(send))
        .route("/messages/{handle}", get(history))
}
