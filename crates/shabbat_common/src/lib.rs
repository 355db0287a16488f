// --- File: crates/shabbat_common/src/lib.rs ---

pub mod error; // Error taxonomy and status mapping
pub mod features; // Runtime channel flags
pub mod http; // Error responses and the shared HTTP client
pub mod logging;
pub mod models; // Domain records
pub mod services; // Sender and transport traits

pub use error::{
    config_error, internal_error, not_found, validation_error, FieldError, HttpStatusCode,
    ShabbatError,
};

pub use http::{
    client::HTTP_CLIENT, handle_json_result, json_error, method_not_allowed, preflight,
    IntoHttpResponse,
};

pub use features::{is_email_enabled, is_feature_enabled, is_firebase_enabled, is_twilio_enabled};
