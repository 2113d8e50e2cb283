//! Session cookie handling.
//!
//! Sessions are stateless signed tokens. The token travels in an
//! HTTP-only, `SameSite=Strict` cookie or an `Authorization: Bearer` header.

use axum::http::{HeaderMap, HeaderValue, header};
use cookie::{Cookie, SameSite, time::Duration};

use crate::services::auth::SESSION_TTL_SECONDS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tl_session";

/// Build the `Set-Cookie` value that stores `token`.
#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(SESSION_TTL_SECONDS))
        .build()
}

/// Build the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Render a cookie as a header value.
#[must_use]
pub fn set_cookie_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Extract the session token from the request.
///
/// An explicit `Authorization: Bearer` header wins over the session cookie.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}
