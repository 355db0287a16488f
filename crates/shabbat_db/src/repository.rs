//! Store contracts
//!
//! One trait per table. Writes are single upserts or inserts; nothing here
//! performs a read-modify-write except [`ReminderPreferencesRepository::claim_occasion`],
//! which is a single conditional update.

use async_trait::async_trait;
use chrono::NaiveDate;
use shabbat_common::models::{
    DeviceRegistration, EmailLogEntry, ReminderPreferences, SavedCity, ShabbatTip, Subscriber,
    SubscriptionPreference,
};

use crate::error::DbError;

#[async_trait]
pub trait SavedCityRepository: Send + Sync {
    /// Insert or overwrite the user's single saved city.
    async fn upsert_city(&self, city: SavedCity) -> Result<SavedCity, DbError>;

    async fn find_city(&self, user_id: &str) -> Result<Option<SavedCity>, DbError>;
}

#[async_trait]
pub trait ReminderPreferencesRepository: Send + Sync {
    /// Insert or overwrite preferences. `last_notified_occasion` is left untouched.
    async fn upsert_preferences(
        &self,
        preferences: ReminderPreferences,
    ) -> Result<ReminderPreferences, DbError>;

    async fn find_preferences(&self, user_id: &str)
        -> Result<Option<ReminderPreferences>, DbError>;

    /// Enabled preferences joined with a saved city; users without a city are left out.
    async fn find_reminder_candidates(
        &self,
    ) -> Result<Vec<(ReminderPreferences, SavedCity)>, DbError>;

    /// Atomically records `occasion` as notified.
    ///
    /// Returns `true` only for the caller that moved the marker; a second
    /// claim for the same occasion returns `false`.
    async fn claim_occasion(&self, user_id: &str, occasion: NaiveDate) -> Result<bool, DbError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn upsert_subscription(
        &self,
        subscription: SubscriptionPreference,
    ) -> Result<SubscriptionPreference, DbError>;

    async fn find_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionPreference>, DbError>;

    /// Every subscribed user joined with their reminder email and saved city.
    async fn find_subscribers(&self) -> Result<Vec<Subscriber>, DbError>;
}

#[async_trait]
pub trait TipRepository: Send + Sync {
    /// Newest first.
    async fn list_tips(&self) -> Result<Vec<ShabbatTip>, DbError>;

    async fn add_tip(&self, content: &str, category: Option<&str>) -> Result<ShabbatTip, DbError>;

    /// `true` if a tip was removed.
    async fn delete_tip(&self, id: i64) -> Result<bool, DbError>;
}

#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    async fn append_log(&self, entry: EmailLogEntry) -> Result<(), DbError>;
}

#[async_trait]
pub trait DeviceRegistrationRepository: Send + Sync {
    /// Insert or refresh the token for `(user_id, device_id)`.
    async fn register_device(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError>;

    async fn find_devices(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError>;
}

/// Everything the service needs from persistence, as one object.
#[async_trait]
pub trait ShabbatStore:
    SavedCityRepository
    + ReminderPreferencesRepository
    + SubscriptionRepository
    + TipRepository
    + EmailLogRepository
    + DeviceRegistrationRepository
{
    /// Create the tables if they don't already exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    async fn is_healthy(&self) -> bool;
}
