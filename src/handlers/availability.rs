use axum::{
    extract::State,
    http::Method,
    response::Response,
};
use serde::Deserialize;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{PathParams, Payload, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "availability/";

#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_available: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl AvailabilityQuery {
    fn to_upstream(&self) -> QueryString {
        QueryString::new()
            .push("doctor_id", self.doctor_id.as_ref())
            .push("date", self.date.as_ref())
            .push("start_date", self.start_date.as_ref())
            .push("end_date", self.end_date.as_ref())
            .push("is_available", self.is_available.as_ref())
            .push("page", self.page.as_ref())
            .push("page_size", self.page_size.as_ref())
    }
}

/// GET /api/availability - doctor schedule slots
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(query.to_upstream());
    relay(&state, call, "Failed to fetch availability").await
}

/// POST /api/availability - publish a new slot
pub async fn create(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::post(COLLECTION).token(token.as_str()).json(body);
    relay(&state, call, "Failed to create availability").await
}

/// GET /api/availability/:id
pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch availability").await
}

/// PUT|PATCH /api/availability/:id - the inbound verb is forwarded as-is
pub async fn update(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    method: Method,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::new(method, format!("{COLLECTION}{id}/"))
        .token(token.as_str())
        .json(body);
    relay(&state, call, "Failed to update availability").await
}

/// DELETE /api/availability/:id - bodyless 204 when the upstream answers 204
pub async fn remove(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::delete(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to delete availability").await
}
