use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// JSON request body whose rejection is rendered as the failure envelope.
///
/// An unreadable body is an unexpected failure (500), not a validation error;
/// required-field checks happen in the handlers.
#[derive(Debug, Clone)]
pub struct Payload<T = Value>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                tracing::error!("Failed to read request body: {}", rejection);
                Err(ApiError::internal_server_error("Failed to process request"))
            }
        }
    }
}

/// Body of an action endpoint where sending nothing is allowed.
/// An empty body reads as `{}`.
pub fn optional_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::error!("Failed to parse request body: {}", e);
        ApiError::internal_server_error("Failed to process request")
    })
}

/// Non-empty string field from a JSON object
pub fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Field holding any non-null value (ids may arrive as numbers or strings)
pub fn field_present(body: &Value, key: &str) -> bool {
    match body.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Fail with a 400 unless every listed field is a non-empty string
pub fn require_fields(body: &Value, keys: &[&str], message: &str) -> Result<(), ApiError> {
    if keys.iter().all(|key| text_field(body, key).is_some()) {
        Ok(())
    } else {
        Err(ApiError::bad_request(message))
    }
}
