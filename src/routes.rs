// src/routes.rs

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{home, posts, tags, users},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Every mutation is a POST answered with a 303 redirect.
/// * Unknown paths fall through to the 404 page.
pub fn create_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/new", get(users::new_user_form).post(users::create_user))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/edit", get(users::edit_user_form).post(users::update_user))
        .route("/users/{id}/delete", post(users::delete_user))
        .route("/users/{id}/posts/new", get(posts::new_post_form).post(posts::create_post));

    let post_routes = Router::new()
        .route("/posts/{id}", get(posts::show_post))
        .route("/posts/{id}/edit", get(posts::edit_post_form).post(posts::update_post))
        .route("/posts/{id}/delete", post(posts::delete_post));

    let tag_routes = Router::new()
        .route("/tags", get(tags::list_tags))
        .route("/tags/new", get(tags::new_tag_form).post(tags::create_tag))
        .route("/tags/{id}", get(tags::show_tag))
        .route("/tags/{id}/edit", get(tags::edit_tag_form).post(tags::update_tag))
        .route("/tags/{id}/delete", post(tags::delete_tag));

    Router::new()
        .route("/", get(home::index))
        .merge(user_routes)
        .merge(post_routes)
        .merge(tag_routes)
        .fallback(home::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
