// --- File: crates/shabbat_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, ShabbatError};

pub mod client;

/// Extension trait for ShabbatError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for ShabbatError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.fields().is_empty() {
            json!({ "error": self.to_string() })
        } else {
            json!({ "error": self.to_string(), "fields": self.fields() })
        };

        (status_code, Json(body)).into_response()
    }
}

impl IntoResponse for ShabbatError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Wraps a successful value in `Json`, turning the error into a response.
pub fn handle_json_result<T>(result: Result<T, ShabbatError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// A JSON `{"error": ...}` response with an explicit status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Answers a CORS preflight unconditionally.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Method fallback for POST-only trigger endpoints.
pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
