use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::error::ApiError;
use crate::middleware::GateContext;

/// Name of the HTTP-only cookie that carries the upstream session token
pub const SESSION_COOKIE: &str = "auth_token";

/// Session lifetime set at login (10 hours)
pub const SESSION_MAX_AGE_SECS: i64 = 10 * 60 * 60;

/// Cookie issued after a successful login
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .build()
}

/// Same cookie, emptied and expired immediately
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Session token read from the request's cookie jar.
///
/// Extracting it in a handler enforces the "token must be present" precondition:
/// without the cookie the request is answered with the 401 envelope and the
/// upstream is never called. Use `Option<SessionToken>` where a token is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().trim())
            .filter(|value| !value.is_empty())
            .map(|value| SessionToken(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Behind the edge gate the cookie has already been read once
        let token = match parts.extensions.get::<GateContext>() {
            Some(context) => context.token.clone(),
            None => Self::from_jar(&CookieJar::from_headers(&parts.headers)),
        };
        token.ok_or_else(ApiError::not_authenticated)
    }
}
