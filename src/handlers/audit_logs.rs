use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::{PathParams, QueryParams};
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::{relay, resource_id};

const COLLECTION: &str = "audit-logs/";

/// Filters for the audit trail. Access control is enforced upstream.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl AuditLogQuery {
    fn to_upstream(&self) -> QueryString {
        QueryString::new()
            .push("user_id", self.user_id.as_ref())
            .push("action", self.action.as_ref())
            .push("resource_type", self.resource_type.as_ref())
            .push("start_date", self.start_date.as_ref())
            .push("end_date", self.end_date.as_ref())
            .push("page", self.page.as_ref())
            .push("page_size", self.page_size.as_ref())
    }
}

/// GET /api/audit-logs
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    QueryParams(query): QueryParams<AuditLogQuery>,
) -> Result<Response, ApiError> {
    let call = UpstreamCall::get(COLLECTION).token(token.as_str()).query(query.to_upstream());
    relay(&state, call, "Failed to fetch audit logs").await
}

/// GET /api/audit-logs/:id
pub async fn show(
    State(state): State<AppState>,
    token: SessionToken,
    PathParams(id): PathParams<String>,
) -> Result<Response, ApiError> {
    let id = resource_id(&id)?;
    let call = UpstreamCall::get(format!("{COLLECTION}{id}/")).token(token.as_str());
    relay(&state, call, "Failed to fetch audit log").await
}
