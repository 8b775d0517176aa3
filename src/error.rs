// src/error.rs

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use std::fmt;

use crate::templates;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to rendered HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate tag name)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Not-found gets the dedicated 404 view, everything else the generic error view.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, template, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error.html",
                    "Something went wrong on our side.".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "error.html", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "404.html", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "error.html", msg),
        };

        let ctx = context! {
            status => status.as_u16(),
            reason => status.canonical_reason().unwrap_or("Error"),
            message => &message,
        };
        let html = match templates::engine().render(template, ctx) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Failed to render {} error page: {}", status.as_u16(), e);
                fallback_html(status, &message)
            }
        };

        (status, Html(html)).into_response()
    }
}

fn fallback_html(status: StatusCode, message: &str) -> String {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        r#"<!DOCTYPE html>
<html><head><title>{} | Blogly</title></head>
<body><h1>{}</h1><p>{}</p></body></html>"#,
        status, status, escaped
    )
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::InternalServerError(format!("template error: {}", err))
    }
}

/// True when the store rejected a write because of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
