//! Adapters for the payload shapes the healthcare API answers with.
//!
//! Some endpoints already wrap their payload in `{success, data}`, some return a
//! JSON:API-like document, list endpoints return a paginated page and the rest
//! return a bare object or array. Each shape is recognised by its discriminating
//! fields and reduced to the value clients receive under `data`.

use serde_json::{Map, Value};

const DOCUMENT_KEYS: &[&str] = &["data", "included", "meta", "links"];

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamShape {
    /// `{ "success": bool, "data"?: ..., ... }`
    Enveloped { success: bool, data: Value },
    /// `{ "data": ..., "included"?: ..., "meta"?: ..., "links"?: ... }`
    Document(Map<String, Value>),
    /// `{ "count": n, "results": [...], "next"?, "previous"? }`
    Paginated(Map<String, Value>),
    Bare(Value),
}

impl UpstreamShape {
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return UpstreamShape::Bare(value);
        };

        if let Some(success) = obj.get("success").and_then(Value::as_bool) {
            let data = obj.remove("data").unwrap_or(Value::Null);
            return UpstreamShape::Enveloped { success, data };
        }

        if obj.contains_key("data") && obj.keys().all(|k| DOCUMENT_KEYS.contains(&k.as_str())) {
            return UpstreamShape::Document(obj);
        }

        if obj.get("results").is_some_and(Value::is_array) && obj.contains_key("count") {
            return UpstreamShape::Paginated(obj);
        }

        UpstreamShape::Bare(Value::Object(obj))
    }

    /// The value handed to the client under `data`
    pub fn into_data(self) -> Value {
        match self {
            UpstreamShape::Enveloped { data, .. } => data,
            UpstreamShape::Document(mut doc) => {
                if doc.len() == 1 {
                    doc.remove("data").unwrap_or(Value::Null)
                } else {
                    Value::Object(doc)
                }
            }
            UpstreamShape::Paginated(page) => Value::Object(page),
            UpstreamShape::Bare(value) => value,
        }
    }
}

/// `{ "success": false, ... }`: a failure the upstream enveloped itself,
/// whatever HTTP status it came with
pub fn reports_failure(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

/// Pull a human-readable error out of an upstream failure body.
pub fn error_detail(body: &Value) -> Option<String> {
    let obj = body.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(msg) = obj.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }

    if let Some(msg) = obj.get("non_field_errors").and_then(first_string) {
        return Some(msg);
    }

    // Field validation errors: { "email": ["This field is required."] }
    obj.values().find_map(first_string)
}

fn first_string(value: &Value) -> Option<String> {
    value.as_array()?.iter().find_map(|v| v.as_str().map(str::to_string))
}
