// --- File: crates/shabbat_email/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sender;
pub mod templates;
pub mod transport;

pub use error::EmailError;
pub use sender::EmailReminderSender;
pub use templates::{DigestEmail, ReminderEmail, DIGEST_SUBJECT, REMINDER_SUBJECT};
pub use transport::ResendEmailTransport;
