// --- File: crates/shabbat_twilio/src/lib.rs ---
/// Twilio error types and their mapping onto delivery failures.
pub mod error;
/// SMS reminder channel.
pub mod twilio_sms;
#[cfg(test)]
mod twilio_sms_test;

pub use error::TwilioError;
pub use twilio_sms::TwilioSmsSender;
