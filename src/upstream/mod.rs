//! Client for the healthcare REST API that owns every resource this service exposes.
//!
//! Calls are described with [`UpstreamCall`], sent through a shared [`UpstreamClient`]
//! and come back as an [`UpstreamReply`], which knows how to turn itself into the
//! `{success, data}` / `{success:false, error, status}` envelope.

pub mod query;
pub mod shape;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::AUTHORIZATION, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::multipart::Form;
use serde_json::Value;

use crate::auth::Role;
use crate::config::UpstreamConfig;
use crate::error::ApiError;
use crate::middleware::ApiResponse;

pub use query::QueryString;
pub use shape::{error_detail, reports_failure, UpstreamShape};

/// Path of the "who am I" endpoint, relative to the base URL
pub const CURRENT_USER_PATH: &str = "auth/user/";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("undecodable response body (status {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("upstream rejected request with status {0}")]
    Rejected(StatusCode),
}

#[derive(Debug)]
pub enum CallBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// One request against the upstream API
#[derive(Debug)]
pub struct UpstreamCall {
    method: Method,
    path: String,
    query: QueryString,
    token: Option<String>,
    body: CallBody,
}

impl UpstreamCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryString::new(),
            token: None,
            body: CallBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, query: QueryString) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = CallBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = CallBody::Multipart(form);
        self
    }

    /// Attach the session token as `Authorization: Token <value>`
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
        })
    }

    /// Base URL + resource path + encoded query (only when there is one)
    pub fn url_for(&self, path: &str, query: &QueryString) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query.encode());
        }
        url
    }

    pub async fn send(&self, call: UpstreamCall) -> Result<UpstreamReply, UpstreamError> {
        let UpstreamCall { method, path, query, token, body } = call;
        let url = self.url_for(&path, &query);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        request = match body {
            CallBody::Empty => request,
            CallBody::Json(value) => request.json(&value),
            CallBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%method, path = %path, status = status.as_u16(), "upstream call");

        UpstreamReply::decode(status, &bytes)
    }

    /// Resolve the user behind a session token. Any non-2xx answer is an error.
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, UpstreamError> {
        let reply = self.send(UpstreamCall::get(CURRENT_USER_PATH).token(token)).await?;
        if !reply.is_success() {
            return Err(UpstreamError::Rejected(reply.status));
        }
        Ok(CurrentUser::from_payload(reply.body.unwrap_or(Value::Null)))
    }
}

/// The user profile returned by the upstream together with its role marker
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub role: Option<Role>,
    pub profile: Value,
}

impl CurrentUser {
    pub fn from_payload(payload: Value) -> Self {
        let profile = UpstreamShape::classify(payload).into_data();
        let role = role_code(&profile)
            .or_else(|| profile.get("user").and_then(role_code))
            .and_then(Role::from_code);
        Self { role, profile }
    }
}

fn role_code(value: &Value) -> Option<i64> {
    let code = value.get("user_type")?;
    code.as_i64().or_else(|| code.as_str()?.trim().parse().ok())
}

/// Status and decoded body of an upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl UpstreamReply {
    pub fn decode(status: StatusCode, bytes: &[u8]) -> Result<Self, UpstreamError> {
        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self { status, body: None });
        }

        match serde_json::from_slice(bytes) {
            Ok(value) => Ok(Self { status, body: Some(value) }),
            Err(source) if status.is_success() => Err(UpstreamError::Decode { status, source }),
            // Error pages that aren't JSON fall back to the generic message
            Err(_) => Ok(Self { status, body: None }),
        }
    }

    /// 2xx and not an enveloped `{ "success": false }`
    pub fn is_success(&self) -> bool {
        self.status.is_success() && !self.body.as_ref().is_some_and(reports_failure)
    }

    /// Envelope for a resource handler: success is always reported as 200
    pub fn into_envelope(self, fallback: &str) -> Result<Response, ApiError> {
        self.respond(fallback, StatusCode::OK)
    }

    /// Envelope for the generic proxy: the upstream status is kept verbatim
    pub fn into_passthrough(self, fallback: &str) -> Result<Response, ApiError> {
        let status = self.status;
        self.respond(fallback, status)
    }

    /// Turn a failed reply into an [`ApiError::Upstream`]. An enveloped failure
    /// that arrived with a 2xx status is reported as 400.
    pub fn into_rejection(self, fallback: &str) -> ApiError {
        let status = if self.status.is_success() {
            StatusCode::BAD_REQUEST
        } else {
            self.status
        };
        let message = self
            .body
            .as_ref()
            .and_then(error_detail)
            .unwrap_or_else(|| fallback.to_string());
        ApiError::upstream(status, message)
    }

    /// Adapted payload, as it would appear under `data`
    pub fn into_data(self) -> Value {
        self.body
            .map(|body| UpstreamShape::classify(body).into_data())
            .unwrap_or(Value::Null)
    }

    fn respond(self, fallback: &str, success_status: StatusCode) -> Result<Response, ApiError> {
        if self.status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::no_content().into_response());
        }
        if !self.is_success() {
            return Err(self.into_rejection(fallback));
        }
        Ok(ApiResponse::with_status(self.into_data(), success_status).into_response())
    }
}
