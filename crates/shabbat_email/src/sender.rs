use shabbat_common::models::ChannelKind;
use shabbat_common::services::{
    BoxFuture, ChannelSender, DeliveryError, DeliveryReceipt, EmailTransport, ReminderNotice,
};
use std::sync::Arc;

use crate::templates::ReminderEmail;

/// Reminder channel that renders the notice as the reminder email.
#[derive(Clone)]
pub struct EmailReminderSender {
    transport: Arc<dyn EmailTransport>,
}

impl EmailReminderSender {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }
}

impl ChannelSender for EmailReminderSender {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn send<'a>(
        &'a self,
        target: &'a str,
        notice: &'a ReminderNotice,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError> {
        Box::pin(async move {
            let message = ReminderEmail {
                city_name: &notice.city_name,
                candle_lighting_time: &notice.candle_lighting_time,
            }
            .to_message(target)?;
            self.transport.send_email(&message).await
        })
    }
}
