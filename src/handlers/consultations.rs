use axum::{
    body::Bytes,
    extract::State,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{optional_body, require_fields, PathParams, Payload, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "consultations/";

#[derive(Debug, Default, Deserialize)]
pub struct ConsultationQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ConsultationQuery {
    fn to_upstream(&self) -> QueryString {
        QueryString::new()
            .push("status", self.status.as_ref())
            .push("date", self.date.as_ref())
            .push("page", self.page.as_ref())
            .push("page_size", self.page_size.as_ref())
    }
}

fn action_path(id: &str, action: &str) -> String {
    format!("{COLLECTION}{id}/{action}/")
}

/// GET /api/consultations
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<ConsultationQuery>,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(query.to_upstream());
    relay(&state, call, "Failed to fetch consultations").await
}

/// GET /api/consultations/:id
pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch consultation").await
}

/// POST /api/consultations/:id/start
pub async fn start(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::post(action_path(id, "start")).token(token.as_str());
    relay(&state, call, "Failed to start consultation").await
}

/// POST /api/consultations/:id/complete
///
/// Expected Input:
/// ```json
/// { "diagnosis": "string", "treatment_plan": "string", "notes"?: "string" }
/// ```
pub async fn complete(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    require_fields(
        &body,
        &["diagnosis", "treatment_plan"],
        "Diagnosis and treatment plan are required",
    )?;

    let call = UpstreamCall::post(action_path(id, "complete"))
        .token(token.as_str())
        .json(body);
    relay(&state, call, "Failed to complete consultation").await
}

/// POST /api/consultations/:id/cancel - optional `{ "reason": "..." }`
pub async fn cancel(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let body = optional_body(&body)?;

    let mut call = UpstreamCall::post(action_path(id, "cancel")).token(token.as_str());
    if let Some(reason) = body.get("reason").filter(|reason| !reason.is_null()) {
        call = call.json(json!({ "reason": reason }));
    }
    relay(&state, call, "Failed to cancel consultation").await
}
