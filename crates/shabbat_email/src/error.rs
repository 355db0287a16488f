use shabbat_common::models::ChannelKind;
use shabbat_common::services::DeliveryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to render email template: {0}")]
    Template(#[from] askama::Error),

    #[error("Email configuration missing: {0}")]
    MissingConfig(&'static str),
}

impl From<EmailError> for DeliveryError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Rejected { status, body } => DeliveryError::Rejected {
                channel: ChannelKind::Email,
                status,
                message: body,
            },
            EmailError::MissingConfig(_) => DeliveryError::ChannelUnavailable(ChannelKind::Email),
            other => DeliveryError::Transport {
                channel: ChannelKind::Email,
                message: other.to_string(),
            },
        }
    }
}
