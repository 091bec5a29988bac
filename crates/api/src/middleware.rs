//! API middleware and shared state.
//!
//! The authentication gate is split into stages so each route group can pick
//! the ones it needs:
//!
//! 1. [`authenticate`] runs on every request and attaches the viewer when a
//!    valid bearer token is present.
//! 2. [`require_active_account`] rejects anonymous and suspended viewers.
//! 3. [`touch_activity`] records the viewer's last activity.
//! 4. [`require_admin`] rejects viewers without the admin role.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};
use tsocial_common::{AppError, Config};
use tsocial_core::{
    AdminService, BookmarkService, LikeService, MessagingService, ModerationService,
    ModerationState, PostService, UserService,
};
use tsocial_db::{
    entities::user,
    repositories::{
        BookmarkRepository, MessageRepository, PostLikeRepository, PostRepository, UserRepository,
    },
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub like_service: LikeService,
    pub bookmark_service: BookmarkService,
    pub messaging_service: MessagingService,
    pub moderation_service: ModerationService,
    pub admin_service: AdminService,
}

impl AppState {
    /// Wire repositories and services over a shared connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let like_repo = PostLikeRepository::new(Arc::clone(&db));
        let bookmark_repo = BookmarkRepository::new(Arc::clone(&db));
        let message_repo = MessageRepository::new(db);

        Self {
            user_service: UserService::new(
                user_repo.clone(),
                &config.auth,
                config.system_account.clone(),
            ),
            post_service: PostService::new(
                post_repo.clone(),
                user_repo.clone(),
                like_repo.clone(),
                bookmark_repo.clone(),
            ),
            like_service: LikeService::new(like_repo, post_repo.clone()),
            bookmark_service: BookmarkService::new(bookmark_repo, post_repo.clone()),
            messaging_service: MessagingService::new(message_repo, user_repo.clone()),
            moderation_service: ModerationService::new(user_repo.clone()),
            admin_service: AdminService::new(user_repo, post_repo),
        }
    }
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

/// Authentication middleware.
///
/// Invalid or missing tokens leave the request anonymous; public routes
/// still work and protected routes are rejected by the next stage.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(error = %e, "Ignoring bearer token"),
        }
    }

    next.run(req).await
}

/// Reject requests without a viewer, or whose viewer is suspended.
pub async fn require_active_account(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    match req.extensions().get::<user::Model>() {
        None => return Err(AppError::Unauthorized),
        Some(viewer) if ModerationState::of(viewer).is_suspended() => {
            return Err(AppError::Forbidden(
                "Your account has been suspended".to_string(),
            ));
        }
        Some(_) => {}
    }

    Ok(next.run(req).await)
}

/// Record the viewer's activity. Failures never fail the request.
pub async fn touch_activity(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(viewer_id) = req.extensions().get::<user::Model>().map(|u| u.id) {
        if let Err(e) = state.user_service.touch_activity(viewer_id).await {
            warn!(user_id = viewer_id, error = %e, "Failed to record activity");
        }
    }

    next.run(req).await
}

/// Reject viewers without the admin role.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let is_admin = req
        .extensions()
        .get::<user::Model>()
        .is_some_and(|viewer| viewer.is_admin);

    if !is_admin {
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
