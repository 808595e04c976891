// handlers/mod.rs - per-resource proxy handlers
//
// Every handler follows the same contract:
//   session token from the cookie jar (401 envelope when missing)
//   → minimal validation of the fields the operation documents (400 envelope)
//   → forward to the upstream API with `Authorization: Token <value>`
//   → normalize the reply into `{success, data}` / `{success:false, error, status}`

pub mod audit_logs;
pub mod auth;
pub mod availability;
pub mod communication;
pub mod consultation_records;
pub mod consultation_requests;
pub mod consultations;
pub mod health;
pub mod medical_records;
pub mod proxy;

use axum::response::Response;

use crate::error::ApiError;
use crate::upstream::UpstreamCall;
use crate::AppState;

/// Send a call upstream and wrap the reply in the response envelope.
/// Transport failures become a 500 carrying `fallback`; the cause is only logged.
pub async fn relay(state: &AppState, call: UpstreamCall, fallback: &str) -> Result<Response, ApiError> {
    let reply = state
        .upstream
        .send(call)
        .await
        .map_err(|e| ApiError::from_upstream_failure(e, fallback))?;
    reply.into_envelope(fallback)
}

/// Path parameter that is safe to splice into an upstream URL
pub fn resource_id(raw: &str) -> Result<&str, ApiError> {
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(raw)
    } else {
        Err(ApiError::bad_request("Invalid identifier"))
    }
}

/// Router fallback: anything the gate let through that no route claims
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
