//! Resend-style transactional email API: `POST {api_url}` with a bearer key
//! and a JSON `{from, to, subject, html}` body.

use reqwest::Client;
use serde::Serialize;
use shabbat_common::models::ChannelKind;
use shabbat_common::services::{
    BoxFuture, DeliveryError, DeliveryReceipt, EmailMessage, EmailTransport,
};
use shabbat_common::HTTP_CLIENT;
use shabbat_config::EmailConfig;
use tracing::{error, info};

use crate::error::EmailError;

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct ResendEmailTransport {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl ResendEmailTransport {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }

    pub async fn deliver(&self, message: &EmailMessage) -> Result<Option<String>, EmailError> {
        let body = SendEmailBody {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Email provider returned {} for {}: {}", status, message.to, body);
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // the provider answers {"id": "..."}; the id is informational only
        let id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string));
        info!("Email '{}' accepted for {}", message.subject, message.to);
        Ok(id)
    }
}

impl std::fmt::Debug for ResendEmailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendEmailTransport")
            .field("api_url", &self.api_url)
            .field("from_address", &self.from_address)
            .finish_non_exhaustive()
    }
}

impl EmailTransport for ResendEmailTransport {
    fn send_email<'a>(
        &'a self,
        message: &'a EmailMessage,
    ) -> BoxFuture<'a, DeliveryReceipt, DeliveryError> {
        Box::pin(async move {
            let reference = self.deliver(message).await?;
            Ok(DeliveryReceipt {
                channel: ChannelKind::Email,
                reference,
            })
        })
    }
}
