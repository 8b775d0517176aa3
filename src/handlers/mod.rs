// src/handlers/mod.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use minijinja::Value;

use crate::{templates::render_page, utils::flash::Flash};

pub mod home;
pub mod posts;
pub mod tags;
pub mod users;

/// Re-render a submitted form with its errors instead of persisting anything.
fn reject_form(
    status: StatusCode,
    template_name: &str,
    ctx: Value,
    flash: &Flash,
) -> Result<Response, crate::error::AppError> {
    let page = render_page(template_name, ctx, flash)?;
    Ok((status, page).into_response())
}
