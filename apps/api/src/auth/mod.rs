//! Registration, login and the session cookie that ties requests to a
//! `Session` in the registry.

pub mod handlers;
pub mod middleware;

use axum::http::{header, HeaderMap};
use chrono::Duration;

use crate::session::SESSION_COOKIE;

/// Identity of the caller, inserted into request extensions by `require_session`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub username: String,
}

pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        ttl.num_seconds()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")
}

/// Extracts the session token from the `Cookie` header, if any.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            pair.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
}
