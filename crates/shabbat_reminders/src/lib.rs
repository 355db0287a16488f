//! Candle-lighting reminders
//!
//! - [`engine`]: decides whether a user's reminder is due and claims the
//!   occasion before sending.
//! - [`dispatcher`]: fans a reminder out to push, email and SMS senders.
//! - [`poller`]: the background task sweeping all users once per interval.
//! - [`routes`]: preference, subscription and manual-check endpoints.

pub mod dispatcher;
pub mod doc;
pub mod engine;
pub mod handlers;
pub mod poller;
#[cfg(test)]
mod poller_test;
pub mod routes;

pub use dispatcher::{DeliveryDispatcher, DispatchReport};
pub use engine::{ReminderOutcome, ReminderRule, ReminderService, SweepSummary};
pub use poller::{start_reminder_polling, PollingHandle, SweepTask};
pub use routes::routes;
