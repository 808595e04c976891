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

use super::{CHANGE_PASSWORD_PATH, RESET_CONFIRM_PATH, RESET_REQUEST_PATH};

/// Identical for every outcome so the endpoint can't be used to probe for accounts
pub const RESET_REQUESTED_MESSAGE: &str = "Password reset code sent to your email";

/// POST /api/auth/change-password
///
/// Requires `old_password`, `new_password` and `confirm_password`; the new
/// password must equal its confirmation.
pub async fn change_password(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    require_fields(
        &body,
        &["old_password", "new_password", "confirm_password"],
        "All password fields are required",
    )?;
    if text_field(&body, "new_password") != text_field(&body, "confirm_password") {
        return Err(ApiError::bad_request("New passwords do not match"));
    }

    let call = UpstreamCall::post(CHANGE_PASSWORD_PATH).token(token.as_str()).json(body);
    relay(&state, call, "Failed to change password").await
}

/// POST /api/auth/reset-password/request
///
/// Always answers with the same success envelope, whether or not the account
/// exists and whether or not the upstream could be reached.
pub async fn reset_password_request(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    require_fields(&body, &["email"], "Email is required")?;

    let call = UpstreamCall::post(RESET_REQUEST_PATH).json(json!({ "email": body["email"] }));
    match state.upstream.send(call).await {
        Ok(reply) if reply.is_success() => tracing::debug!("password reset requested"),
        Ok(reply) => tracing::info!(status = reply.status.as_u16(), "password reset request not accepted upstream"),
        Err(e) => tracing::error!("password reset request failed: {}", e),
    }

    Ok(ApiResponse::success(json!({ "message": RESET_REQUESTED_MESSAGE })).into_response())
}

/// POST /api/auth/reset-password/confirm
///
/// Requires `email`, `code`, `password` and `confirm_password`. The password
/// must match its confirmation and satisfy the strength policy before the
/// upstream is contacted.
pub async fn reset_password_confirm(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    require_fields(
        &body,
        &["email", "code", "password", "confirm_password"],
        "Email, code and both password fields are required",
    )?;

    let password = text_field(&body, "password").unwrap_or_default();
    if Some(password) != text_field(&body, "confirm_password") {
        return Err(ApiError::bad_request("Passwords do not match"));
    }
    validate_password_strength(password).map_err(ApiError::bad_request)?;

    let call = UpstreamCall::post(RESET_CONFIRM_PATH).json(body);
    relay(&state, call, "Failed to reset password").await
}
