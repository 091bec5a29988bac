//! Admin and moderation endpoints.
//!
//! Mounted behind the admin gate, so every handler can assume an active
//! administrator.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tsocial_common::AppResult;
use tsocial_core::AppealDecision;

use crate::{
    extractors::{AppJson, AuthUser},
    middleware::AppState,
    response::{ActionResponse, AdminUserResponse, AppealResponse, StatsResponse},
};

async fn stats(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    Ok(Json(state.admin_service.stats().await?.into()))
}

async fn users(State(state): State<AppState>) -> AppResult<Json<Vec<AdminUserResponse>>> {
    let users = state.admin_service.users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Suspend request. The body is optional.
#[derive(Debug, Deserialize)]
pub struct SuspendRequest {
    pub reason: Option<String>,
}

async fn suspend(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<AppJson<SuspendRequest>>,
) -> AppResult<Json<ActionResponse>> {
    let reason = body.and_then(|AppJson(req)| req.reason);
    state
        .moderation_service
        .suspend(&admin, id, reason.as_deref())
        .await?;

    Ok(Json(ActionResponse::ok("Account suspended")))
}

async fn unsuspend(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ActionResponse>> {
    state.moderation_service.unsuspend(&admin, id).await?;
    Ok(Json(ActionResponse::ok("Suspension lifted")))
}

async fn appeals(State(state): State<AppState>) -> AppResult<Json<Vec<AppealResponse>>> {
    let pending = state.moderation_service.pending_appeals().await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// Resolve request, `action` is `approve` or `reject`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub action: String,
}

async fn resolve(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    AppJson(req): AppJson<ResolveRequest>,
) -> AppResult<Json<ActionResponse>> {
    let decision = state
        .moderation_service
        .resolve_appeal(&admin, user_id, &req.action)
        .await?;

    let message = match decision {
        AppealDecision::Approve => "Appeal approved, account reinstated",
        AppealDecision::Reject => "Appeal rejected",
    };
    Ok(Json(ActionResponse::ok(message)))
}

/// Role change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub is_admin: bool,
}

/// Role change response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub success: bool,
    pub is_admin: bool,
}

async fn set_role(
    AuthUser(admin): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(req): AppJson<RoleRequest>,
) -> AppResult<Json<RoleResponse>> {
    state
        .moderation_service
        .set_role(&admin, id, req.is_admin)
        .await?;

    Ok(Json(RoleResponse {
        success: true,
        is_admin: req.is_admin,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(users))
        .route("/users/{id}", delete(suspend))
        .route("/users/{id}/unsuspend", post(unsuspend))
        .route("/users/{id}/role", put(set_role))
        .route("/appeals", get(appeals))
        .route("/appeals/{user_id}/resolve", post(resolve))
}
