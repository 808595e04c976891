use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{PathParams, Payload, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "medical-records/";

#[derive(Debug, Default, Deserialize)]
pub struct MedicalRecordQuery {
    pub patient_id: Option<String>,
    pub record_type: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<MedicalRecordQuery>,
) -> Result<Response, ApiError> {
    let upstream_query = QueryString::new()
        .push("patient_id", query.patient_id.as_ref())
        .push("record_type", query.record_type.as_ref())
        .push("page", query.page.as_ref())
        .push("page_size", query.page_size.as_ref());
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(upstream_query);
    relay(&state, call, "Failed to fetch medical records").await
}

pub async fn create(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::post(COLLECTION).token(token.as_str()).json(body);
    relay(&state, call, "Failed to create medical record").await
}

pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch medical record").await
}

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
    relay(&state, call, "Failed to update medical record").await
}
