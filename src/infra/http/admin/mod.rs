mod comments;
mod dashboard;
mod health;
mod posts;
mod selectors;
mod session;
mod shared;
mod state;
mod subscribers;
mod taxonomy;

pub use state::AdminState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::infra::assets;

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState, upload_body_limit: usize) -> Router {
    let gated = Router::new()
        .route("/", get(dashboard::admin_dashboard))
        .route("/posts", get(posts::admin_posts))
        .route("/posts/panel", post(posts::admin_posts_panel))
        .route("/posts/new", get(posts::admin_post_new))
        .route("/posts/create", post(posts::admin_post_create))
        .route("/posts/preview", post(posts::admin_post_preview))
        .route("/posts/slug", post(posts::admin_post_slug_hint))
        .route("/posts/tags", post(posts::admin_post_tags))
        .route(
            "/posts/featured",
            post(posts::admin_post_featured_upload)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            "/posts/{id}/edit",
            get(posts::admin_post_edit).post(posts::admin_post_update),
        )
        .route("/posts/{id}/autosave", post(posts::admin_post_autosave))
        .route("/posts/{id}/publish", post(posts::admin_post_publish))
        .route("/posts/{id}/unpublish", post(posts::admin_post_unpublish))
        .route("/posts/{id}/delete", post(posts::admin_post_delete))
        .route("/comments", get(comments::admin_comments))
        .route("/comments/panel", post(comments::admin_comments_panel))
        .route(
            "/comments/{id}/approve",
            post(comments::admin_comment_approve),
        )
        .route("/comments/{id}/reject", post(comments::admin_comment_reject))
        .route("/comments/{id}/edit", post(comments::admin_comment_update))
        .route("/comments/{id}/delete", post(comments::admin_comment_delete))
        .route("/categories", get(taxonomy::admin_categories))
        .route(
            "/categories/create",
            post(taxonomy::admin_category_create),
        )
        .route(
            "/categories/{id}/edit",
            post(taxonomy::admin_category_update),
        )
        .route(
            "/categories/{id}/delete",
            post(taxonomy::admin_category_delete),
        )
        .route("/tags", get(taxonomy::admin_tags))
        .route("/tags/create", post(taxonomy::admin_tag_create))
        .route("/tags/{id}/edit", post(taxonomy::admin_tag_update))
        .route("/tags/{id}/delete", post(taxonomy::admin_tag_delete))
        .route("/subscribers", get(subscribers::admin_subscribers))
        .route(
            "/subscribers/{id}/delete",
            post(subscribers::admin_subscriber_delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .merge(gated)
        .route(
            "/login",
            get(session::admin_login_page).post(session::admin_login),
        )
        .route("/logout", post(session::admin_logout))
        .route("/session/refresh", post(session::admin_session_refresh))
        .route("/_health", get(health::admin_health))
        .route("/static/admin/{*path}", get(assets::serve_admin))
        .route("/static/common/{*path}", get(assets::serve_common))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
