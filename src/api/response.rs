use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;

use crate::api::models::{ErrorBody, HealthResponse};

/// Upstream JSON is handed back untouched on success.
pub fn passthrough(body: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(body))
}

pub fn error(
    status: StatusCode,
    error: impl Into<String>,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            message: message.into(),
        }),
    )
}

pub fn health(has_token: bool) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            has_token,
        }),
    )
}
