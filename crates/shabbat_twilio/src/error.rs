use shabbat_common::models::ChannelKind;
use shabbat_common::services::DeliveryError;
use thiserror::Error;

/// Twilio-specific error types.
#[derive(Error, Debug)]
pub enum TwilioError {
    /// Error occurred during a Twilio API request
    #[error("Twilio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Twilio API
    #[error("Twilio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },
}

impl From<TwilioError> for DeliveryError {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::ApiError {
                status_code,
                message,
            } => DeliveryError::Rejected {
                channel: ChannelKind::Sms,
                status: status_code,
                message,
            },
            TwilioError::RequestError(e) => DeliveryError::Transport {
                channel: ChannelKind::Sms,
                message: e.to_string(),
            },
        }
    }
}
