//! Authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use tsocial_common::AppResult;
use tsocial_core::RegisterInput;

use crate::{extractors::AppJson, middleware::AppState, response::ActionResponse};

/// Register response.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub handle: String,
    pub name: String,
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let session = state.user_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            token: session.token,
            handle: session.account.handle,
            name: session.account.name,
        }),
    ))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub handle: String,
    pub name: String,
    pub is_admin: bool,
}

/// Sign in. Suspended accounts get a 403 carrying the suspension details.
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let session = state.user_service.login(&req.handle, &req.password).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        handle: session.account.handle,
        name: session.account.name,
        is_admin: session.account.is_admin,
    }))
}

/// Appeal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealRequest {
    pub handle: String,
    pub password: String,
    #[serde(default)]
    pub appeal_text: String,
}

/// File an appeal against a suspension. Authenticated by password since
/// suspended accounts cannot hold a token.
async fn appeal(
    State(state): State<AppState>,
    AppJson(req): AppJson<AppealRequest>,
) -> AppResult<Json<ActionResponse>> {
    state
        .moderation_service
        .file_appeal(&req.handle, &req.password, &req.appeal_text)
        .await?;

    Ok(Json(ActionResponse::ok(
        "Your appeal has been received and will be reviewed",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/appeal", post(appeal))
}
