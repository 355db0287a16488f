use shabbat_common::models::ChannelKind;
use shabbat_common::services::{
    BoxFuture, ChannelSender, DeliveryError, DeliveryReceipt, ReminderNotice,
};
use shabbat_db::{DeviceRegistrationRepository, ShabbatStore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::{FcmMessage, FirebaseClient};
use crate::error::FirebaseError;

/// Push channel. The target is a user id; the user's registered devices are
/// looked up at send time.
#[derive(Clone)]
pub struct PushReminderSender {
    client: FirebaseClient,
    store: Arc<dyn ShabbatStore>,
}

impl PushReminderSender {
    pub fn new(client: FirebaseClient, store: Arc<dyn ShabbatStore>) -> Self {
        Self { client, store }
    }

    async fn push_to_user(
        &self,
        user_id: &str,
        notice: &ReminderNotice,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let devices = self
            .store
            .find_devices(user_id)
            .await
            .map_err(FirebaseError::from)?;
        if devices.is_empty() {
            warn!("No push device registered for user: {}", user_id);
            return Err(DeliveryError::PermissionDenied(format!(
                "no registered device for user {}",
                user_id
            )));
        }

        // one accepting device is enough
        let mut accepted = None;
        let mut last_error = None;
        for device in &devices {
            let message = FcmMessage::reminder(&device.registration_token, notice);
            match self.client.send_message(&message).await {
                Ok(name) => {
                    info!("Push sent to device {} of user {}", device.device_id, user_id);
                    accepted.get_or_insert(name);
                }
                Err(e) => {
                    warn!(
                        "Push to device {} of user {} failed: {}",
                        device.device_id, user_id, e
                    );
                    last_error = Some(e);
                }
            }
        }

        match (accepted, last_error) {
            (Some(name), _) => Ok(DeliveryReceipt {
                channel: ChannelKind::Push,
                reference: Some(name),
            }),
            (None, Some(e)) => Err(e.into()),
            (None, None) => Err(DeliveryError::PermissionDenied(user_id.to_string())),
        }
    }
}

impl ChannelSender for PushReminderSender {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Push
    }

    fn send<'a>(
        &'a self,
        target: &'a str,
        notice: &'a ReminderNotice,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError> {
        Box::pin(self.push_to_user(target, notice))
    }
}
