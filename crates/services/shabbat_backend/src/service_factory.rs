//! Service factory implementation.
//!
//! Builds the outbound senders the running configuration switches on. A
//! channel whose flag is off, whose section is missing, or whose client
//! fails to build has no sender; the dispatcher then reports it as
//! unavailable instead of failing the whole reminder.
use shabbat_common::models::ChannelKind;
use shabbat_common::services::{ChannelSender, EmailTransport, ServiceFactory};
use shabbat_common::{is_email_enabled, is_firebase_enabled, is_twilio_enabled};
use shabbat_config::AppConfig;
use shabbat_db::ShabbatStore;
use shabbat_email::{EmailReminderSender, ResendEmailTransport};
use shabbat_firebase::{FirebaseClient, PushReminderSender};
use shabbat_twilio::TwilioSmsSender;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ShabbatServiceFactory {
    email_transport: Option<Arc<dyn EmailTransport>>,
    sms_sender: Option<Arc<dyn ChannelSender>>,
    push_sender: Option<Arc<dyn ChannelSender>>,
}

impl ShabbatServiceFactory {
    /// `store` backs the push channel's device lookup.
    pub fn new(config: &AppConfig, store: Arc<dyn ShabbatStore>) -> Self {
        let email_transport = config
            .email
            .as_ref()
            .filter(|_| is_email_enabled(config))
            .map(|email| {
                info!("Initializing email transport...");
                Arc::new(ResendEmailTransport::new(email)) as Arc<dyn EmailTransport>
            });

        let sms_sender = config
            .twilio
            .as_ref()
            .filter(|_| is_twilio_enabled(config))
            .map(|twilio| {
                info!("Initializing Twilio SMS sender...");
                Arc::new(TwilioSmsSender::new(twilio)) as Arc<dyn ChannelSender>
            });

        let push_sender = config
            .firebase
            .as_ref()
            .filter(|_| is_firebase_enabled(config))
            .and_then(|firebase| match FirebaseClient::from_config(firebase) {
                Ok(client) => {
                    info!("Initializing Firebase push sender...");
                    Some(Arc::new(PushReminderSender::new(client, store)) as Arc<dyn ChannelSender>)
                }
                Err(e) => {
                    warn!("Firebase push disabled: {}", e);
                    None
                }
            });

        Self {
            email_transport,
            sms_sender,
            push_sender,
        }
    }
}

impl ServiceFactory for ShabbatServiceFactory {
    fn sender(&self, channel: ChannelKind) -> Option<Arc<dyn ChannelSender>> {
        match channel {
            ChannelKind::Email => self.email_transport.clone().map(|transport| {
                Arc::new(EmailReminderSender::new(transport)) as Arc<dyn ChannelSender>
            }),
            ChannelKind::Sms => self.sms_sender.clone(),
            ChannelKind::Push => self.push_sender.clone(),
        }
    }

    fn email_transport(&self) -> Option<Arc<dyn EmailTransport>> {
        self.email_transport.clone()
    }
}
