//! Delivery Dispatcher
//!
//! Fans a reminder out to every selected channel. Channels are independent:
//! a failed or unavailable channel is recorded and the next one is still tried.

use shabbat_common::models::{ChannelKind, ReminderChannel};
use shabbat_common::services::{
    ChannelSender, DeliveryError, DeliveryReceipt, ReminderNotice, ServiceFactory,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Per-channel outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub delivered: Vec<DeliveryReceipt>,
    pub failed: Vec<DeliveryError>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn delivered_channels(&self) -> Vec<ChannelKind> {
        self.delivered.iter().map(|r| r.channel).collect()
    }
}

#[derive(Clone, Default)]
pub struct DeliveryDispatcher {
    senders: HashMap<ChannelKind, Arc<dyn ChannelSender>>,
}

impl DeliveryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sender` for its channel, replacing any previous one.
    pub fn with_sender(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.insert(sender.channel(), sender);
        self
    }

    /// One sender per channel the factory has enabled.
    pub fn from_factory(factory: &dyn ServiceFactory) -> Self {
        [ChannelKind::Push, ChannelKind::Email, ChannelKind::Sms]
            .into_iter()
            .filter_map(|kind| factory.sender(kind))
            .fold(Self::new(), Self::with_sender)
    }

    pub fn has_sender(&self, channel: ChannelKind) -> bool {
        self.senders.contains_key(&channel)
    }

    pub async fn dispatch(
        &self,
        user_id: &str,
        channels: &[ReminderChannel],
        notice: &ReminderNotice,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for channel in channels {
            let kind = channel.kind();
            let result = match self.senders.get(&kind) {
                Some(sender) => sender.send(channel.target(user_id), notice).await,
                None => Err(DeliveryError::ChannelUnavailable(kind)),
            };

            match result {
                Ok(receipt) => {
                    info!("Reminder delivered to user {} via {}", user_id, kind);
                    report.delivered.push(receipt);
                }
                Err(e) => {
                    error!("Reminder to user {} via {} failed: {}", user_id, kind, e);
                    report.failed.push(e);
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for DeliveryDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryDispatcher")
            .field("channels", &self.senders.keys().collect::<Vec<_>>())
            .finish()
    }
}
