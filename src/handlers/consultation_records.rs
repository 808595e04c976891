use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{optional_body, require_fields, PathParams, Payload, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "consultation-records/";
const UPLOAD_FALLBACK: &str = "Failed to upload attachment";

#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub consultation_id: Option<String>,
    pub patient_id: Option<String>,
}

/// GET /api/consultation-records
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<RecordQuery>,
) -> Result<Response, ApiError> {
    let upstream_query = QueryString::new()
        .push("consultation_id", query.consultation_id.as_ref())
        .push("patient_id", query.patient_id.as_ref());
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(upstream_query);
    relay(&state, call, "Failed to fetch consultation records").await
}

/// GET /api/consultation-records/:id
pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch consultation record").await
}

/// POST /api/consultation-records/:id/notes - `{ "notes": "..." }` is required
pub async fn add_notes(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    require_fields(&body, &["notes"], "Notes are required")?;

    let call = UpstreamCall::post(format!("{COLLECTION}{id}/notes/"))
        .token(token.as_str())
        .json(body);
    relay(&state, call, "Failed to save notes").await
}

/// POST /api/consultation-records/:id/attachments - multipart upload
///
/// The `file` field is required and is forwarded with its original name and
/// content type. Any other text fields travel along unchanged.
pub async fn upload_attachment(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let mut multipart = multipart.map_err(|e| {
        tracing::error!("Failed to read multipart body: {}", e);
        ApiError::internal_server_error(UPLOAD_FALLBACK)
    })?;

    let mut form = Form::new();
    let mut has_file = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::internal_server_error(UPLOAD_FALLBACK)
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("attachment").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                tracing::error!("Failed to read uploaded file: {}", e);
                ApiError::internal_server_error(UPLOAD_FALLBACK)
            })?;

            let mut part = Part::bytes(bytes.to_vec()).file_name(file_name);
            if let Some(content_type) = content_type {
                part = part
                    .mime_str(&content_type)
                    .map_err(|_| ApiError::bad_request("Invalid file content type"))?;
            }
            form = form.part("file", part);
            has_file = true;
        } else if !name.is_empty() {
            let value = field.text().await.map_err(|e| {
                tracing::error!("Failed to read form field '{}': {}", name, e);
                ApiError::internal_server_error(UPLOAD_FALLBACK)
            })?;
            form = form.text(name, value);
        }
    }

    if !has_file {
        return Err(ApiError::bad_request("No file provided"));
    }

    let call = UpstreamCall::post(format!("{COLLECTION}{id}/attachments/"))
        .token(token.as_str())
        .multipart(form);
    relay(&state, call, UPLOAD_FALLBACK).await
}

/// POST /api/consultation-records/:id/complete - finalize the record
pub async fn complete(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let body = optional_body(&body)?;

    let call = UpstreamCall::post(format!("{COLLECTION}{id}/complete/"))
        .token(token.as_str())
        .json(body);
    relay(&state, call, "Failed to complete consultation record").await
}
