use shabbat_common::services::DeliveryError;
use shabbat_common::ShabbatError;
use shabbat_db::DbError;
use shabbat_email::EmailError;
use shabbat_times::OccasionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Occasion(#[from] OccasionError),

    #[error(transparent)]
    Render(#[from] EmailError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Email service is disabled")]
    EmailDisabled,

    #[error("Failed to send test email")]
    TestSendFailed,
}

impl From<DigestError> for ShabbatError {
    fn from(err: DigestError) -> Self {
        match err {
            DigestError::Store(e) => e.into(),
            DigestError::Occasion(e) => e.into(),
            DigestError::Delivery(e) => e.into(),
            DigestError::EmailDisabled => {
                ShabbatError::ConfigError("Email service is disabled".to_string())
            }
            other => ShabbatError::InternalError(other.to_string()),
        }
    }
}
