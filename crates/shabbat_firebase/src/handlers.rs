use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use shabbat_common::models::DeviceRegistration;
use shabbat_common::{validation_error, FieldError, ShabbatError};
use shabbat_db::{DeviceRegistrationRepository, ShabbatStore};
use std::sync::Arc;
use tracing::{debug, info};

// State for the device registration routes
#[derive(Clone)]
pub struct FirebaseState {
    pub store: Arc<dyn ShabbatStore>,
}

/// A device token handed over by the client after notification permission was granted.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceRequest {
    pub device_id: String,
    pub registration_token: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceResponse {
    pub success: bool,
    pub user_id: String,
    pub device_id: String,
}

fn registration_errors(request: &RegisterDeviceRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if request.device_id.trim().is_empty() {
        errors.push(FieldError::new("device_id", "Device id is required"));
    }
    if request.registration_token.trim().is_empty() {
        errors.push(FieldError::new(
            "registration_token",
            "Registration token is required",
        ));
    }
    errors
}

/// Register (or refresh) a push token for one of the user's devices.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/users/{user_id}/devices",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    request_body = RegisterDeviceRequest,
    responses(
        (status = 200, description = "Device registered", body = RegisterDeviceResponse),
        (status = 400, description = "Missing device id or token"),
        (status = 500, description = "Store error")
    ),
    tag = "Push"
))]
pub async fn register_device_handler(
    State(state): State<Arc<FirebaseState>>,
    Path(user_id): Path<String>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<Json<RegisterDeviceResponse>, ShabbatError> {
    debug!("Registering device for user: {}", user_id);

    let errors = registration_errors(&request);
    if !errors.is_empty() {
        return Err(validation_error(errors));
    }

    let registration = state
        .store
        .register_device(DeviceRegistration::new(
            user_id,
            request.device_id.trim().to_string(),
            request.registration_token.trim().to_string(),
        ))
        .await?;

    info!(
        "Registered device {} for user: {}",
        registration.device_id, registration.user_id
    );
    Ok(Json(RegisterDeviceResponse {
        success: true,
        user_id: registration.user_id,
        device_id: registration.device_id,
    }))
}
