use axum::{
    body::Bytes,
    extract::State,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{field_present, optional_body, PathParams, Payload, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "consultation-requests/";

#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub status: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl RequestQuery {
    fn to_upstream(&self) -> QueryString {
        QueryString::new()
            .push("status", self.status.as_ref())
            .push("doctor_id", self.doctor_id.as_ref())
            .push("patient_id", self.patient_id.as_ref())
            .push("page", self.page.as_ref())
            .push("page_size", self.page_size.as_ref())
    }
}

/// GET /api/consultation-requests
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<RequestQuery>,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(query.to_upstream());
    relay(&state, call, "Failed to fetch consultation requests").await
}

/// POST /api/consultation-requests - book an availability slot
///
/// `availability_id` is required. Double-booking is the upstream's call.
pub async fn create(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    if !field_present(&body, "availability_id") {
        return Err(ApiError::bad_request("Availability ID is required"));
    }

    let call = UpstreamCall::post(COLLECTION).token(token.as_str()).json(body);
    relay(&state, call, "Failed to create consultation request").await
}

/// GET /api/consultation-requests/:id
pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch consultation request").await
}

/// PATCH /api/consultation-requests/:id
pub async fn update(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::patch(format!("{COLLECTION}{id}/"))
        .token(token.as_str())
        .json(body);
    relay(&state, call, "Failed to update consultation request").await
}

/// DELETE /api/consultation-requests/:id
pub async fn remove(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::delete(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to delete consultation request").await
}

/// POST /api/consultation-requests/:id/accept
pub async fn accept(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::post(format!("{COLLECTION}{id}/accept/")).token(token.as_str());
    relay(&state, call, "Failed to accept consultation request").await
}

/// POST /api/consultation-requests/:id/reject - optional `{ "reason": "..." }`
pub async fn reject(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let body = optional_body(&body)?;
    let reason = body.get("reason").cloned().unwrap_or_default();

    let mut call = UpstreamCall::post(format!("{COLLECTION}{id}/reject/")).token(token.as_str());
    if !reason.is_null() {
        call = call.json(json!({ "reason": reason }));
    }
    relay(&state, call, "Failed to reject consultation request").await
}
