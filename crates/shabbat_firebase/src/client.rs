//! Firebase Cloud Messaging client
//!
//! Sends single-device messages through the FCM HTTP v1 API
//! (`POST {base}/v1/projects/{project_id}/messages:send`).

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use shabbat_common::services::ReminderNotice;
use shabbat_common::HTTP_CLIENT;
use shabbat_config::FirebaseConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::{AccessTokenProvider, ServiceAccountTokenProvider};
use crate::error::FirebaseError;

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// Top-level FCM v1 request body.
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: Message,
}

#[derive(Debug, Serialize)]
pub struct Message {
    /// Registration token of the target device
    pub token: String,

    pub notification: Option<Notification>,

    /// Custom key-value data available to the receiving app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// FCM answers with the message resource name,
/// e.g. "projects/{project_id}/messages/{message_id}".
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    pub name: String,
}

impl FcmMessage {
    /// The candle-lighting reminder for one device. The tag travels as data so
    /// the client can collapse repeated notifications.
    pub fn reminder(token: &str, notice: &ReminderNotice) -> Self {
        let data = HashMap::from([
            ("tag".to_string(), notice.tag.clone()),
            ("city_name".to_string(), notice.city_name.clone()),
            (
                "candle_lighting_time".to_string(),
                notice.candle_lighting_time.clone(),
            ),
        ]);
        Self {
            message: Message {
                token: token.to_string(),
                notification: Some(Notification {
                    title: notice.title.clone(),
                    body: notice.body.clone(),
                }),
                data: Some(data),
            },
        }
    }
}

#[derive(Clone)]
pub struct FirebaseClient {
    client: Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FirebaseClient {
    pub fn new(
        config: &FirebaseConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, FirebaseError> {
        let project_id = config.project_id.clone().ok_or_else(|| {
            FirebaseError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;
        let base_url = config
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_FCM_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: HTTP_CLIENT.clone(),
            base_url,
            project_id,
            tokens,
        })
    }

    /// Client authenticated with the configured service account key.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        let key_path = config.key_path.clone().ok_or_else(|| {
            FirebaseError::ConfigError("Missing key_path in FirebaseConfig".to_string())
        })?;
        Self::new(config, Arc::new(ServiceAccountTokenProvider::new(key_path)))
    }

    pub(crate) fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        )
    }

    /// Sends one message and returns the FCM message name.
    pub async fn send_message(&self, message: &FcmMessage) -> Result<String, FirebaseError> {
        let token = self.tokens.access_token().await?;

        debug!("Sending FCM message to project {}", self.project_id);
        let response = self
            .client
            .post(self.send_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("FCM returned {}: {}", status, message);
            return Err(FirebaseError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let fcm_response: FcmResponse = response.json().await?;
        Ok(fcm_response.name)
    }
}

impl std::fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
