use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::ChannelKind;
use crate::services::DeliveryError;

/// A single rejected input field and the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The error taxonomy shared by every crate of the service.
///
/// Crate-level errors (`DbError`, `OccasionError`, `DeliveryError`, ...) convert
/// into one of these variants so handlers can map them to a status code.
#[derive(Error, Debug)]
pub enum ShabbatError {
    /// Malformed user input, caught before anything is persisted.
    #[error("{message}")]
    ValidationError {
        message: String,
        fields: Vec<FieldError>,
    },

    /// The backing store failed on read or write.
    #[error("Store error: {0}")]
    StoreError(String),

    /// No sunset could be computed for the coordinates and date.
    #[error("Times unavailable: {0}")]
    GeoComputationError(String),

    /// A numeric argument outside its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An outbound channel refused or failed the send.
    #[error("Delivery via {channel} failed: {message}")]
    DeliveryError {
        channel: ChannelKind,
        message: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ShabbatError {
    fn status_code(&self) -> u16 {
        match self {
            ShabbatError::ValidationError { .. } => 400,
            ShabbatError::StoreError(_) => 500,
            ShabbatError::GeoComputationError(_) => 422,
            ShabbatError::InvalidArgument(_) => 400,
            ShabbatError::DeliveryError { .. } => 502,
            ShabbatError::ConfigError(_) => 500,
            ShabbatError::NotFoundError(_) => 404,
            ShabbatError::InternalError(_) => 500,
        }
    }
}

impl ShabbatError {
    /// Field-level messages, empty for every variant but `ValidationError`.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            ShabbatError::ValidationError { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl From<DeliveryError> for ShabbatError {
    fn from(err: DeliveryError) -> Self {
        ShabbatError::DeliveryError {
            channel: err.channel(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ShabbatError {
    fn from(err: serde_json::Error) -> Self {
        ShabbatError::InvalidArgument(err.to_string())
    }
}

impl From<std::io::Error> for ShabbatError {
    fn from(err: std::io::Error) -> Self {
        ShabbatError::InternalError(err.to_string())
    }
}

pub fn validation_error(fields: Vec<FieldError>) -> ShabbatError {
    let message = match fields.as_slice() {
        [single] => single.message.clone(),
        _ => "Invalid input".to_string(),
    };
    ShabbatError::ValidationError { message, fields }
}

pub fn config_error<T: fmt::Display>(message: T) -> ShabbatError {
    ShabbatError::ConfigError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ShabbatError {
    ShabbatError::NotFoundError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> ShabbatError {
    ShabbatError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error(vec![]).status_code(), 400);
        assert_eq!(ShabbatError::StoreError("x".into()).status_code(), 500);
        assert_eq!(ShabbatError::GeoComputationError("x".into()).status_code(), 422);
        assert_eq!(not_found("city").status_code(), 404);
        let delivery: ShabbatError = DeliveryError::ChannelUnavailable(ChannelKind::Sms).into();
        assert_eq!(delivery.status_code(), 502);
    }

    #[test]
    fn test_single_field_message_is_promoted() {
        let err = validation_error(vec![FieldError::new("email_address", "Invalid email address")]);
        assert_eq!(err.to_string(), "Invalid email address");
        assert_eq!(err.fields().len(), 1);
    }
}
