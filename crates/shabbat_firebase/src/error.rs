use shabbat_common::models::ChannelKind;
use shabbat_common::services::DeliveryError;
use shabbat_db::DbError;
use thiserror::Error;

/// Errors that can occur when talking to Firebase Cloud Messaging
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// The service account could not produce an access token
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// FCM answered with a non-success status
    #[error("Firebase API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Device registrations could not be read
    #[error("Device lookup failed: {0}")]
    StoreError(#[from] DbError),
}

impl From<FirebaseError> for DeliveryError {
    fn from(err: FirebaseError) -> Self {
        match err {
            FirebaseError::ConfigError(_) => DeliveryError::ChannelUnavailable(ChannelKind::Push),
            FirebaseError::ApiError { status, message } => DeliveryError::Rejected {
                channel: ChannelKind::Push,
                status,
                message,
            },
            other => DeliveryError::Transport {
                channel: ChannelKind::Push,
                message: other.to_string(),
            },
        }
    }
}
