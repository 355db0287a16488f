#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{RegisterDeviceRequest, RegisterDeviceResponse};

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::register_device_handler),
    components(schemas(RegisterDeviceRequest, RegisterDeviceResponse)),
    tags((name = "Push", description = "Push device registration"))
)]
pub struct FirebaseApiDoc;
