use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use crate::auth::session_cookie;
use crate::error::ApiError;
use crate::middleware::{require_fields, ApiResponse, Payload};
use crate::upstream::UpstreamCall;
use crate::AppState;

use super::LOGIN_PATH;

const LOGIN_FALLBACK: &str = "Login failed";

/// POST /api/auth/login - exchange credentials for a session cookie
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// On success the upstream token goes into the `auth_token` cookie only; the
/// JSON body carries the rest of the upstream payload (typically the user).
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Payload(body): Payload,
) -> Result<(CookieJar, Response), ApiError> {
    require_fields(&body, &["email", "password"], "Email and password are required")?;

    let reply = state
        .upstream
        .send(UpstreamCall::post(LOGIN_PATH).json(body))
        .await
        .map_err(|e| ApiError::from_upstream_failure(e, LOGIN_FALLBACK))?;

    if !reply.is_success() {
        tracing::info!(status = reply.status.as_u16(), "login rejected upstream");
        return Err(reply.into_rejection("Invalid credentials"));
    }

    let mut payload = reply.into_data();
    let token = take_token(&mut payload).ok_or_else(|| {
        tracing::error!("Login succeeded upstream but no token was returned");
        ApiError::internal_server_error("Invalid response from authentication server")
    })?;

    let jar = jar.add(session_cookie(&token, state.config.secure_cookies()));
    Ok((jar, ApiResponse::success(payload).into_response()))
}

/// Remove every token-bearing field from the login payload and return the first one found
fn take_token(payload: &mut Value) -> Option<String> {
    let mut found = strip_token_fields(payload);
    if let Some(inner) = payload.get_mut("data") {
        let nested = strip_token_fields(inner);
        found = found.or(nested);
    }
    found.filter(|token| !token.is_empty())
}

fn strip_token_fields(value: &mut Value) -> Option<String> {
    let obj = value.as_object_mut()?;
    let mut found = None;
    for key in ["token", "key"] {
        if let Some(Value::String(token)) = obj.remove(key) {
            found.get_or_insert(token);
        }
    }
    found
}
