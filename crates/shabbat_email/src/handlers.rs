// --- File: crates/shabbat_email/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use shabbat_common::json_error;
use shabbat_common::services::EmailTransport;
use std::sync::Arc;
use tracing::{error, info};

use crate::templates::ReminderEmail;

#[derive(Clone)]
pub struct EmailState {
    /// `None` when the email channel is switched off.
    pub transport: Option<Arc<dyn EmailTransport>>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReminderEmailRequest {
    pub email_address: Option<String>,
    pub candle_lighting_time: Option<String>,
    pub city_name: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn send_reminder_email(state: &EmailState, body: &[u8]) -> Result<(), String> {
    let request: ReminderEmailRequest =
        serde_json::from_slice(body).map_err(|e| e.to_string())?;

    let (Some(to), Some(time), Some(city)) = (
        required(&request.email_address),
        required(&request.candle_lighting_time),
        required(&request.city_name),
    ) else {
        return Err("Missing required fields".to_string());
    };

    let transport = state
        .transport
        .as_ref()
        .ok_or_else(|| "Email service is disabled".to_string())?;

    let message = ReminderEmail {
        city_name: city,
        candle_lighting_time: time,
    }
    .to_message(to)
    .map_err(|e| e.to_string())?;

    transport.send_email(&message).await.map_err(|e| {
        error!("Reminder email to {} failed: {}", to, e);
        "Failed to send email".to_string()
    })?;
    info!("Reminder email sent to {} for {}", to, city);
    Ok(())
}

/// Sends one reminder email on behalf of a client.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/send-reminder-email",
    request_body = ReminderEmailRequest,
    responses(
        (status = 200, description = "Email accepted by the provider", body = TriggerResponse),
        (status = 405, description = "Method other than POST or OPTIONS"),
        (status = 500, description = "Missing fields or delivery failure")
    ),
    tag = "Email"
))]
pub async fn send_reminder_email_handler(
    State(state): State<Arc<EmailState>>,
    body: Bytes,
) -> Response {
    match send_reminder_email(&state, &body).await {
        Ok(()) => (
            StatusCode::OK,
            Json(TriggerResponse {
                success: true,
                message: "Reminder email sent".to_string(),
            }),
        )
            .into_response(),
        Err(message) => {
            error!("send-reminder-email: {}", message);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}
