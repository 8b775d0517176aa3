use axum::{extract::State, response::Response};
use minijinja::context;
use sqlx::SqlitePool;

use crate::{
    error::AppError, models::post::Post, templates::render_page, utils::flash::Flash,
};

/// How many posts the homepage shows.
pub const LATEST_POSTS_LIMIT: i64 = 5;

/// Homepage: the most recent posts, newest first.
pub async fn index(
    State(pool): State<SqlitePool>,
    flash: Flash,
) -> Result<Response, AppError> {
    let posts = Post::latest(&pool, LATEST_POSTS_LIMIT).await.map_err(|e| {
        tracing::error!("Failed to load latest posts: {:?}", e);
        AppError::from(e)
    })?;

    render_page("home.html", context! { posts => posts }, &flash)
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
