// --- File: crates/shabbat_common/src/services.rs ---
//! Outbound delivery abstractions.
//!
//! The reminder dispatcher and the digest job only see these traits; the
//! Twilio, Firebase and email crates provide the implementations and the
//! backend wires them up through a [`ServiceFactory`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::models::ChannelKind;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Why a single channel send did not go through.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    /// The channel is switched off or not configured.
    #[error("{0} channel is not available")]
    ChannelUnavailable(ChannelKind),

    /// Push only: the user has no device that accepted notifications.
    #[error("Push permission unavailable: {0}")]
    PermissionDenied(String),

    /// The request never got a response.
    #[error("{channel} transport error: {message}")]
    Transport {
        channel: ChannelKind,
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("{channel} provider rejected the request ({status}): {message}")]
    Rejected {
        channel: ChannelKind,
        status: u16,
        message: String,
    },
}

impl DeliveryError {
    pub fn channel(&self) -> ChannelKind {
        match self {
            DeliveryError::ChannelUnavailable(channel) => *channel,
            DeliveryError::PermissionDenied(_) => ChannelKind::Push,
            DeliveryError::Transport { channel, .. } => *channel,
            DeliveryError::Rejected { channel, .. } => *channel,
        }
    }
}

/// What the provider handed back for an accepted send.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub channel: ChannelKind,
    pub reference: Option<String>,
}

impl DeliveryReceipt {
    pub fn accepted(channel: ChannelKind) -> Self {
        Self {
            channel,
            reference: None,
        }
    }
}

pub const REMINDER_TITLE: &str = "Shabbat Reminder";
pub const REMINDER_TAG: &str = "shabbat-reminder";

/// The content of one candle-lighting reminder, rendered per channel by the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderNotice {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub city_name: String,
    /// Already formatted for display, e.g. "05:54 PM".
    pub candle_lighting_time: String,
}

impl ReminderNotice {
    pub fn new(city_name: impl Into<String>, candle_lighting_time: impl Into<String>) -> Self {
        let city_name = city_name.into();
        let candle_lighting_time = candle_lighting_time.into();
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!(
                "Shabbat candle lighting in {} at {}",
                city_name, candle_lighting_time
            ),
            tag: REMINDER_TAG.to_string(),
            city_name,
            candle_lighting_time,
        }
    }
}

/// A single delivery channel.
///
/// `target` is the channel's address: an email address, a phone number, or
/// the user id whose devices receive a push.
pub trait ChannelSender: Send + Sync {
    fn channel(&self) -> ChannelKind;

    fn send<'a>(
        &'a self,
        target: &'a str,
        notice: &'a ReminderNotice,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError>;
}

/// A fully rendered transactional email.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transactional email capability; success means the provider accepted it.
pub trait EmailTransport: Send + Sync {
    fn send_email<'a>(
        &'a self,
        message: &'a EmailMessage,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError>;
}

/// Hands out the senders that are enabled in the running configuration.
pub trait ServiceFactory: Send + Sync {
    fn sender(&self, channel: ChannelKind) -> Option<Arc<dyn ChannelSender>>;

    fn email_transport(&self) -> Option<Arc<dyn EmailTransport>>;
}
