//! Firebase Cloud Messaging push reminders
//!
//! - [`PushReminderSender`]: the push channel of the reminder dispatcher.
//!   It resolves the user's registered devices at send time; a user without
//!   any is reported as `DeliveryError::PermissionDenied`.
//! - [`routes`]: `POST /users/{user_id}/devices` to register a device token.
//!
//! ```rust,no_run
//! use shabbat_config::FirebaseConfig;
//! use shabbat_firebase::{FirebaseClient, PushReminderSender};
//! use shabbat_db::MemoryShabbatStore;
//! use std::sync::Arc;
//!
//! fn build(config: &FirebaseConfig) -> Result<PushReminderSender, shabbat_firebase::FirebaseError> {
//!     let client = FirebaseClient::from_config(config)?;
//!     Ok(PushReminderSender::new(client, Arc::new(MemoryShabbatStore::new())))
//! }
//! ```

pub mod auth;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod push;
pub mod routes;

pub use auth::{AccessTokenProvider, ServiceAccountTokenProvider, StaticTokenProvider};
pub use client::FirebaseClient;
pub use error::FirebaseError;
pub use push::PushReminderSender;
pub use routes::routes;
