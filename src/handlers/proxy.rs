//! Generic forwarder for resources that have no dedicated handler.
//!
//! The client posts `{ url, method?, data?, params? }`; the call is replayed
//! against the upstream base URL with the session token attached and the
//! upstream status passed through verbatim (204 included).

use axum::{extract::State, http::Method, response::Response};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::auth::SessionToken;
use crate::error::ApiError;
use crate::middleware::Payload;
use crate::upstream::{QueryString, UpstreamCall};
use crate::AppState;

const PROXY_FALLBACK: &str = "Request failed";

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

/// POST /api/proxy
pub async fn forward(
    State(state): State<AppState>,
    token: SessionToken,
    Payload(body): Payload,
) -> Result<Response, ApiError> {
    let request: ProxyRequest = serde_json::from_value(body)
        .map_err(|_| ApiError::bad_request("Invalid proxy request"))?;

    let target = proxy_target(&request.url)?;
    let method = proxy_method(request.method.as_deref())?;

    let mut call = UpstreamCall::new(method.clone(), target)
        .token(token.as_str())
        .query(proxy_query(request.params));
    if method != Method::GET {
        if let Some(data) = request.data {
            call = call.json(data);
        }
    }

    let reply = state
        .upstream
        .send(call)
        .await
        .map_err(|e| ApiError::from_upstream_failure(e, PROXY_FALLBACK))?;
    reply.into_passthrough(PROXY_FALLBACK)
}

/// Upstream path for a client-supplied target. Only paths relative to the
/// upstream base URL are accepted, so the token can't be sent to another host.
pub fn proxy_target(url: &str) -> Result<String, ApiError> {
    let invalid = || ApiError::bad_request("Invalid proxy target");
    let url = url.trim();

    // Only the path decides where the call goes; the query may carry anything
    let path = url.split(&['?', '#'][..]).next().unwrap_or_default();
    if path.is_empty() || path.starts_with("//") || path.contains("://") || path.contains('\\') {
        return Err(invalid());
    }
    if path.split('/').any(is_parent_segment) {
        return Err(invalid());
    }

    Ok(url.trim_start_matches('/').to_string())
}

fn is_parent_segment(segment: &str) -> bool {
    segment.to_ascii_lowercase().replace("%2e", ".") == ".."
}

pub fn proxy_method(method: Option<&str>) -> Result<Method, ApiError> {
    let Some(raw) = method else {
        return Ok(Method::GET);
    };
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .ok()
        .filter(|method| {
            [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
        })
        .ok_or_else(|| ApiError::bad_request(format!("Unsupported method: {}", raw)))
}

/// Scalars are stringified, arrays repeat the key, nulls are dropped
pub fn proxy_query(params: Option<Map<String, Value>>) -> QueryString {
    let mut query = QueryString::new();
    for (key, value) in params.into_iter().flatten() {
        match value {
            Value::Array(items) => {
                for item in &items {
                    query.append(&key, scalar(item));
                }
            }
            other => query.append(&key, scalar(&other)),
        }
    }
    query
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relative_targets_are_accepted() {
        assert_eq!(proxy_target("/doctors/").unwrap(), "doctors/");
        assert_eq!(proxy_target("patients/4/").unwrap(), "patients/4/");
        assert_eq!(proxy_target("/doctors/?specialty=general").unwrap(), "doctors/?specialty=general");
    }

    #[test]
    fn urls_in_the_query_do_not_affect_the_target() {
        assert_eq!(
            proxy_target("redirects/?next=http://x").unwrap(),
            "redirects/?next=http://x"
        );
        assert_eq!(proxy_target("files/?path=a\\b").unwrap(), "files/?path=a\\b");
    }

    #[test]
    fn targets_leaving_the_upstream_are_rejected() {
        for target in [
            "",
            "http://evil.example/steal",
            "//evil.example/steal",
            "/doctors/../../admin",
            "/doctors/%2E%2E/admin",
            "\\\\evil",
            "?next=/admin",
            "http://evil.example?x=1",
        ] {
            assert!(proxy_target(target).is_err(), "accepted {target:?}");
        }
    }

    #[test]
    fn method_defaults_to_get_and_is_case_insensitive() {
        assert_eq!(proxy_method(None).unwrap(), Method::GET);
        assert_eq!(proxy_method(Some("patch")).unwrap(), Method::PATCH);
        assert!(proxy_method(Some("TRACE")).is_err());
        assert!(proxy_method(Some("not a method")).is_err());
    }

    #[test]
    fn params_become_query_pairs() {
        let params = json!({ "status": "active", "page": 2, "empty": "", "skip": null, "ids": [1, 2] });
        let query = proxy_query(params.as_object().cloned());
        let encoded = query.encode();
        assert!(encoded.contains("status=active"));
        assert!(encoded.contains("page=2"));
        assert!(encoded.contains("ids=1&ids=2"));
        assert!(!encoded.contains("empty"));
        assert!(!encoded.contains("skip"));
    }
}
