// --- File: crates/shabbat_twilio/src/twilio_sms.rs ---
use reqwest::Client;
use serde::Deserialize;
use shabbat_common::models::ChannelKind;
use shabbat_common::services::{
    BoxFuture, ChannelSender, DeliveryError, DeliveryReceipt, ReminderNotice,
};
use shabbat_common::HTTP_CLIENT;
use shabbat_config::TwilioConfig;
use tracing::{error, info};

use crate::error::TwilioError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";

#[derive(Deserialize, Debug)]
struct MessageResource {
    sid: Option<String>,
}

/// Sends the reminder text as an SMS from the configured number.
#[derive(Clone)]
pub struct TwilioSmsSender {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsSender {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            base_url: config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.phone_number.clone(),
        }
    }

    pub(crate) fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    pub async fn send_sms(&self, to: &str, body: &str) -> Result<Option<String>, TwilioError> {
        let params = [
            ("To", to),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];
        info!("Sending SMS to {}", to);
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Twilio returned {}: {}", status, text);
            return Err(TwilioError::ApiError {
                status_code: status.as_u16(),
                message: text,
            });
        }

        let sid = serde_json::from_str::<MessageResource>(&text)
            .ok()
            .and_then(|m| m.sid);
        info!("SMS sent to {} (sid {:?})", to, sid);
        Ok(sid)
    }
}

impl std::fmt::Debug for TwilioSmsSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSmsSender")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

impl ChannelSender for TwilioSmsSender {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    fn send<'a>(
        &'a self,
        target: &'a str,
        notice: &'a ReminderNotice,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError> {
        Box::pin(async move {
            let reference = self.send_sms(target, &notice.body).await?;
            Ok(DeliveryReceipt {
                channel: ChannelKind::Sms,
                reference,
            })
        })
    }
}
