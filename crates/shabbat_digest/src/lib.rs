//! Friday digest
//!
//! [`DigestJob`] renders and sends the weekly digest; scheduling it is left to
//! whatever calls `POST /send-shabbat-email` (a cron trigger in production).

pub mod doc;
pub mod error;
pub mod handlers;
pub mod job;
pub mod routes;

pub use error::DigestError;
pub use job::{DigestJob, DigestSummary, DEFAULT_TIP};
pub use routes::routes;
