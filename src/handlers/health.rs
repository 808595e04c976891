use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/health - liveness of this layer only; the upstream is not probed
pub async fn health() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
