//! One-shot confirmation messages carried across the post/redirect/get cycle
//! in a cookie.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use url::form_urlencoded;

pub const FLASH_COOKIE: &str = "blogly_flash";

/// The flash message sent by the browser with this request, if any.
#[derive(Debug, Clone, Default)]
pub struct Flash {
    jar: CookieJar,
    message: Option<String>,
}

impl Flash {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let message = jar.get(FLASH_COOKIE).and_then(|cookie| decode(cookie.value()));

        Self { jar, message }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Cookie changes that expire the message once it has been rendered.
    /// Empty when the request carried no flash cookie.
    pub fn clear(&self) -> CookieJar {
        self.jar.clone().remove(Cookie::build(FLASH_COOKIE).path("/"))
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash::from_headers(&parts.headers))
    }
}

/// 303 redirect that leaves `message` for the next rendered page.
pub fn redirect_with_flash(to: &str, message: impl AsRef<str>) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, encode(message.as_ref())))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (CookieJar::new().add(cookie), Redirect::to(to)).into_response()
}

fn encode(message: &str) -> String {
    form_urlencoded::byte_serialize(message.as_bytes()).collect()
}

fn decode(value: &str) -> Option<String> {
    // `&` and `=` are percent-encoded by `encode`, so the whole value parses as one key.
    form_urlencoded::parse(value.as_bytes())
        .next()
        .map(|(message, _)| message.into_owned())
        .filter(|message| !message.is_empty())
}
