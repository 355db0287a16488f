use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shabbat_common::models::ShabbatTip;
use shabbat_common::{json_error, not_found, validation_error, FieldError, ShabbatError};
use shabbat_db::{ShabbatStore, TipRepository};
use std::sync::Arc;
use tracing::{error, info};

use crate::job::DigestJob;

#[derive(Clone)]
pub struct DigestState {
    pub job: Arc<DigestJob>,
    pub store: Arc<dyn ShabbatStore>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DigestRequest {
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub test_email: Option<String>,
}

impl DigestRequest {
    /// The address to send the sample to, when this is a test run.
    pub fn test_target(&self) -> Option<&str> {
        if !self.test_mode {
            return None;
        }
        self.test_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DigestResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_count: Option<usize>,
}

async fn run_digest(state: &DigestState, body: &[u8]) -> Result<DigestResponse, String> {
    // an empty body means a plain batch run
    let request: DigestRequest = if body.iter().all(u8::is_ascii_whitespace) {
        DigestRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|e| e.to_string())?
    };

    if let Some(email) = request.test_target() {
        state.job.run_test(email).await.map_err(|e| e.to_string())?;
        return Ok(DigestResponse {
            success: true,
            message: "Test email sent successfully".to_string(),
            success_count: None,
            failure_count: None,
        });
    }

    let summary = state
        .job
        .run_batch(Utc::now())
        .await
        .map_err(|e| e.to_string())?;
    Ok(DigestResponse {
        success: true,
        message: "Email sending completed".to_string(),
        success_count: Some(summary.success_count),
        failure_count: Some(summary.failure_count),
    })
}

/// Runs the Friday digest, or a single sample send in test mode.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/send-shabbat-email",
    request_body = DigestRequest,
    responses(
        (status = 200, description = "Run completed", body = DigestResponse),
        (status = 405, description = "Method other than POST or OPTIONS"),
        (status = 500, description = "The run could not be carried out")
    ),
    tag = "Digest"
))]
pub async fn send_shabbat_email_handler(
    State(state): State<Arc<DigestState>>,
    body: Bytes,
) -> Response {
    match run_digest(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(message) => {
            error!("send-shabbat-email: {}", message);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewTipRequest {
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/tips",
    responses((status = 200, description = "All tips, newest first", body = [ShabbatTip])),
    tag = "Tips"
))]
pub async fn list_tips_handler(
    State(state): State<Arc<DigestState>>,
) -> Result<Json<Vec<ShabbatTip>>, ShabbatError> {
    Ok(Json(state.store.list_tips().await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/tips",
    request_body = NewTipRequest,
    responses(
        (status = 200, description = "Tip created", body = ShabbatTip),
        (status = 400, description = "Blank content")
    ),
    tag = "Tips"
))]
pub async fn add_tip_handler(
    State(state): State<Arc<DigestState>>,
    Json(request): Json<NewTipRequest>,
) -> Result<Json<ShabbatTip>, ShabbatError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(validation_error(vec![FieldError::new(
            "content",
            "Tip content is required",
        )]));
    }
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let tip = state.store.add_tip(content, category).await?;
    info!("Tip {} added", tip.id);
    Ok(Json(tip))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/tips/{id}",
    params(("id" = i64, Path, description = "Tip id")),
    responses(
        (status = 204, description = "Tip deleted"),
        (status = 404, description = "No such tip")
    ),
    tag = "Tips"
))]
pub async fn delete_tip_handler(
    State(state): State<Arc<DigestState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ShabbatError> {
    if state.store.delete_tip(id).await? {
        info!("Tip {} deleted", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(format!("Tip {}", id)))
    }
}
