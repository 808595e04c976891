use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth::{validate_password_strength, SessionToken};
use crate::error::ApiError;
use crate::handlers::relay;
use crate::middleware::{require_fields, text_field, ApiResponse, Payload};
use crate::upstream::UpstreamCall;
use crate::AppState;

use super::{REGISTER_PATH, UPDATE_PROFILE_PATH, USER_PATH};

/// GET /api/auth/user - profile of the signed-in user
pub async fn user(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    let call = UpstreamCall::get(USER_PATH).token(token.as_str());
    relay(&state, call, "Failed to fetch user").await
}

/// GET /api/auth/session - auth-status check a client runs at startup
///
/// Never fails: a missing cookie or a token the upstream no longer accepts
/// both read as `{ "authenticated": false }`.
pub async fn session_status(State(state): State<AppState>, token: Option<SessionToken>) -> Response {
    let Some(token) = token else {
        return ApiResponse::success(json!({ "authenticated": false })).into_response();
    };

    match state.upstream.current_user(token.as_str()).await {
        Ok(user) => ApiResponse::success(json!({
            "authenticated": true,
            "role": user.role.map(|role| role.code()),
            "user": user.profile,
        }))
        .into_response(),
        Err(e) => {
            tracing::info!("session check failed: {}", e);
            ApiResponse::success(json!({ "authenticated": false })).into_response()
        }
    }
}

/// PUT|PATCH /api/auth/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::patch(UPDATE_PROFILE_PATH).token(token.as_str()).json(body);
    relay(&state, call, "Failed to update profile").await
}

/// POST /api/auth/register - create a patient account (no session required)
pub async fn register(State(state): State<AppState>, Payload(body): Payload) -> Result<Response, ApiError> {
    require_fields(&body, &["email", "password"], "Email and password are required")?;

    let password = text_field(&body, "password").unwrap_or_default();
    if let Some(confirm) = body.get("confirm_password") {
        if confirm.as_str() != Some(password) {
            return Err(ApiError::bad_request("Passwords do not match"));
        }
    }
    validate_password_strength(password).map_err(ApiError::bad_request)?;

    let call = UpstreamCall::post(REGISTER_PATH).json(body);
    relay(&state, call, "Registration failed").await
}
