use std::sync::LazyLock;

use axum::response::{Html, IntoResponse, Response};
use minijinja::{Value, context};

use crate::{error::AppError, utils::flash::Flash};

mod engine;

pub use engine::MiniJinjaEngine;

// Templates are compiled into the binary, so one immutable engine serves every request.
static ENGINE: LazyLock<MiniJinjaEngine> =
    LazyLock::new(|| MiniJinjaEngine::new().expect("Embedded templates must compile"));

pub fn engine() -> &'static MiniJinjaEngine {
    &ENGINE
}

/// Render a full page.
///
/// The pending flash message (if any) is exposed to the layout as `flash`
/// and the flash cookie is cleared on the way out, so it shows exactly once.
pub fn render_page(template_name: &str, ctx: Value, flash: &Flash) -> Result<Response, AppError> {
    let ctx = context! { flash => flash.message(), ..ctx };
    let html = engine().render(template_name, ctx)?;

    Ok((flash.clear(), Html(html)).into_response())
}
