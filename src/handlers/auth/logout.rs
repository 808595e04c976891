use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::auth::{cleared_session_cookie, SessionToken};
use crate::middleware::ApiResponse;
use crate::upstream::UpstreamCall;
use crate::AppState;

use super::LOGOUT_PATH;

/// POST /api/auth/logout - end the local session
///
/// The upstream is notified on a best-effort basis. The cookie is cleared no
/// matter what the upstream says or whether it can be reached at all.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    if let Some(token) = SessionToken::from_jar(&jar) {
        let call = UpstreamCall::post(LOGOUT_PATH).token(token.as_str());
        match state.upstream.send(call).await {
            Ok(reply) if reply.is_success() => tracing::debug!("upstream session closed"),
            Ok(reply) => tracing::warn!(status = reply.status.as_u16(), "upstream logout not accepted"),
            Err(e) => tracing::warn!("upstream logout failed: {}", e),
        }
    }

    let jar = jar.add(cleared_session_cookie(state.config.secure_cookies()));
    let body = ApiResponse::success(json!({ "message": "Logged out successfully" }));
    (jar, body.into_response())
}
