//! API endpoints.

mod admin;
mod auth;
mod bookmarks;
mod explore;
mod messages;
mod posts;
mod profile;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};

use crate::middleware::{AppState, require_active_account, require_admin, touch_activity};

/// Create the API router.
///
/// Protected and admin routes carry their gate stages as route layers. The
/// [`authenticate`](crate::middleware::authenticate) stage must be layered
/// around the whole router by the caller.
pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .nest("/auth", auth::router())
        .merge(posts::public())
        .merge(profile::public())
        .merge(explore::public());

    // Route layers run bottom-up: suspension check, then activity touch.
    let protected = Router::new()
        .merge(posts::protected())
        .merge(profile::protected())
        .merge(bookmarks::protected())
        .merge(messages::protected())
        .route_layer(from_fn_with_state(state.clone(), touch_activity))
        .route_layer(from_fn(require_active_account));

    let admin = admin::router()
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), touch_activity))
        .route_layer(from_fn(require_active_account));

    public.merge(protected).nest("/admin", admin)
}
