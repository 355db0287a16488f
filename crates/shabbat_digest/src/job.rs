//! Digest Batch Job
//!
//! Sends the Friday digest to every subscriber that has both a reminder email
//! address and a saved city. Subscribers missing either are skipped without
//! being counted. One tip is drawn per run and shared by all recipients.
//! Recipients are isolated: a failed send or a location without a sunset is
//! logged and counted, and the run carries on.

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use shabbat_common::models::{EmailLogEntry, SavedCity};
use shabbat_common::services::{EmailMessage, EmailTransport};
use shabbat_db::{EmailLogRepository, ShabbatStore, SubscriptionRepository, TipRepository};
use shabbat_email::DigestEmail;
use shabbat_times::format::format_time;
use shabbat_times::{next_occasion_date, OccasionCalculator};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::DigestError;

pub const DEFAULT_TIP: &str =
    "Take time to disconnect from devices and connect with loved ones this Shabbat.";

/// User id recorded in the email log for test sends.
pub const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

pub const SAMPLE_CITY: &str = "Jerusalem, Israel (Sample)";
pub const SAMPLE_CANDLE_LIGHTING: &str = "17:45";
pub const SAMPLE_SUNSET: &str = "18:03";
pub const SAMPLE_HAVDALAH: &str = "19:05";

/// Logged for every failed delivery, whatever the provider said.
pub const DELIVERY_FAILED: &str = "Email delivery failed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DigestSummary {
    pub success_count: usize,
    pub failure_count: usize,
    /// Subscribers without an email address or a saved city.
    #[serde(skip)]
    pub skipped: usize,
}

pub struct DigestJob {
    store: Arc<dyn ShabbatStore>,
    calculator: OccasionCalculator,
    transport: Option<Arc<dyn EmailTransport>>,
    unsubscribe_base_url: String,
    offset_minutes: i64,
}

impl DigestJob {
    pub fn new(
        store: Arc<dyn ShabbatStore>,
        calculator: OccasionCalculator,
        transport: Option<Arc<dyn EmailTransport>>,
        unsubscribe_base_url: impl Into<String>,
        offset_minutes: i64,
    ) -> Self {
        Self {
            store,
            calculator,
            transport,
            unsubscribe_base_url: unsubscribe_base_url.into(),
            offset_minutes,
        }
    }

    fn transport(&self) -> Result<&Arc<dyn EmailTransport>, DigestError> {
        self.transport.as_ref().ok_or(DigestError::EmailDisabled)
    }

    /// A random tip from the store; the default tip when there are none or
    /// the store cannot be read.
    pub async fn pick_tip(&self) -> String {
        let tips = match self.store.list_tips().await {
            Ok(tips) => tips,
            Err(e) => {
                warn!("Falling back to the default tip: {}", e);
                return DEFAULT_TIP.to_string();
            }
        };
        let contents: Vec<&str> = tips
            .iter()
            .map(|t| t.content.trim())
            .filter(|c| !c.is_empty())
            .collect();
        contents
            .choose(&mut rand::thread_rng())
            .map(|c| c.to_string())
            .unwrap_or_else(|| DEFAULT_TIP.to_string())
    }

    /// Sends the sample digest to `email`.
    pub async fn run_test(&self, email: &str) -> Result<(), DigestError> {
        let transport = self.transport()?;
        let tip = self.pick_tip().await;
        let message = DigestEmail {
            city_name: SAMPLE_CITY,
            candle_lighting: SAMPLE_CANDLE_LIGHTING,
            sunset: SAMPLE_SUNSET,
            havdalah: SAMPLE_HAVDALAH,
            tip: &tip,
            unsubscribe_url: &self.unsubscribe_base_url,
        }
        .to_message(email)?;

        match transport.send_email(&message).await {
            Ok(_) => {
                info!("Test digest sent to {}", email);
                self.log(EmailLogEntry::success(TEST_USER_ID, email)).await;
                Ok(())
            }
            Err(e) => {
                error!("Test digest to {} failed: {}", email, e);
                self.log(EmailLogEntry::failed(TEST_USER_ID, email, DELIVERY_FAILED))
                    .await;
                Err(DigestError::TestSendFailed)
            }
        }
    }

    /// Sends the digest for the occasion that `now` refers to.
    pub async fn run_batch(&self, now: DateTime<Utc>) -> Result<DigestSummary, DigestError> {
        let transport = self.transport()?;
        let subscribers = self.store.find_subscribers().await?;
        let date = next_occasion_date(&now.with_timezone(&self.calculator.tz()));
        let tip = self.pick_tip().await;
        let mut summary = DigestSummary::default();

        info!(
            "Digest run for {}: {} subscribers",
            date,
            subscribers.len()
        );

        for subscriber in &subscribers {
            let (Some(email), Some(city)) = (
                subscriber
                    .email_address
                    .as_deref()
                    .filter(|e| !e.trim().is_empty()),
                subscriber.city.as_ref(),
            ) else {
                summary.skipped += 1;
                continue;
            };

            let sent = match self.render(city, date, &tip, &subscriber.user_id, email) {
                Ok(message) => transport
                    .send_email(&message)
                    .await
                    .map_err(DigestError::from),
                Err(e) => Err(e),
            };

            match sent {
                Ok(_) => {
                    summary.success_count += 1;
                    self.log(EmailLogEntry::success(&subscriber.user_id, email))
                        .await;
                }
                Err(e) => {
                    error!("Digest to {} ({}) failed: {}", email, subscriber.user_id, e);
                    summary.failure_count += 1;
                    self.log(EmailLogEntry::failed(
                        &subscriber.user_id,
                        email,
                        DELIVERY_FAILED,
                    ))
                    .await;
                }
            }
        }

        info!(
            "Digest run for {} finished: {} sent, {} failed, {} skipped",
            date, summary.success_count, summary.failure_count, summary.skipped
        );
        Ok(summary)
    }

    fn render(
        &self,
        city: &SavedCity,
        date: NaiveDate,
        tip: &str,
        user_id: &str,
        email: &str,
    ) -> Result<EmailMessage, DigestError> {
        let tz = self.calculator.tz();
        let occasion = self.calculator.occasion_for_date(
            date,
            city.latitude,
            city.longitude,
            self.offset_minutes,
        )?;
        let havdalah = self
            .calculator
            .havdalah(date, city.latitude, city.longitude)?;
        let unsubscribe_url = format!("{}?user_id={}", self.unsubscribe_base_url, user_id);

        Ok(DigestEmail {
            city_name: &city.city_name,
            candle_lighting: &format_time(occasion.candle_lighting, tz),
            sunset: &format_time(occasion.sunset, tz),
            havdalah: &format_time(havdalah, tz),
            tip,
            unsubscribe_url: &unsubscribe_url,
        }
        .to_message(email)?)
    }

    // The audit log never fails a delivery that already happened.
    async fn log(&self, entry: EmailLogEntry) {
        if let Err(e) = self.store.append_log(entry).await {
            warn!("Could not write email log: {}", e);
        }
    }
}

impl std::fmt::Debug for DigestJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestJob")
            .field("unsubscribe_base_url", &self.unsubscribe_base_url)
            .field("offset_minutes", &self.offset_minutes)
            .field("email_enabled", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
