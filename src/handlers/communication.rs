use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::QueryParams;
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

use super::relay;

const TOKEN_PATH: &str = "communication/token/";

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub consultation_id: Option<String>,
}

/// GET /api/communication/token - credentials for the video/chat service
///
/// The upstream issues the token; this layer only forwards it inside the
/// usual envelope.
pub async fn token(
    State(state): State<AppState>,
    session: SessionToken,
    QueryParams(query): QueryParams<TokenQuery>,
) -> Result<Response, ApiError> {
    let upstream_query = QueryString::new().push("consultation_id", query.consultation_id.as_ref());
    let call = UpstreamCall::get(TOKEN_PATH).token(session.as_str()).query(upstream_query);
    relay(&state, call, "Failed to get communication token").await
}
