//! In-process store
//!
//! Used when no `[database]` section is configured and by the test suites of
//! the service crates. Everything lives behind one mutex, so the occasion
//! claim is exactly as atomic as the SQL conditional update.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shabbat_common::models::{
    DeviceRegistration, EmailLogEntry, ReminderPreferences, SavedCity, ShabbatTip, Subscriber,
    SubscriptionPreference,
};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::DbError;
use crate::repository::{
    DeviceRegistrationRepository, EmailLogRepository, ReminderPreferencesRepository,
    SavedCityRepository, ShabbatStore, SubscriptionRepository, TipRepository,
};

#[derive(Debug, Default)]
struct Tables {
    cities: HashMap<String, SavedCity>,
    preferences: HashMap<String, ReminderPreferences>,
    subscriptions: HashMap<String, SubscriptionPreference>,
    tips: Vec<ShabbatTip>,
    next_tip_id: i64,
    email_log: Vec<EmailLogEntry>,
    devices: HashMap<(String, String), DeviceRegistration>,
}

#[derive(Debug, Default)]
pub struct MemoryShabbatStore {
    tables: Mutex<Tables>,
}

impl MemoryShabbatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the email log in insertion order.
    pub async fn email_log(&self) -> Vec<EmailLogEntry> {
        self.tables.lock().await.email_log.clone()
    }
}

#[async_trait]
impl SavedCityRepository for MemoryShabbatStore {
    async fn upsert_city(&self, city: SavedCity) -> Result<SavedCity, DbError> {
        let city = SavedCity {
            updated_at: Some(Utc::now()),
            ..city
        };
        self.tables
            .lock()
            .await
            .cities
            .insert(city.user_id.clone(), city.clone());
        Ok(city)
    }

    async fn find_city(&self, user_id: &str) -> Result<Option<SavedCity>, DbError> {
        Ok(self.tables.lock().await.cities.get(user_id).cloned())
    }
}

#[async_trait]
impl ReminderPreferencesRepository for MemoryShabbatStore {
    async fn upsert_preferences(
        &self,
        preferences: ReminderPreferences,
    ) -> Result<ReminderPreferences, DbError> {
        let mut tables = self.tables.lock().await;
        let last_notified_occasion = tables
            .preferences
            .get(&preferences.user_id)
            .and_then(|existing| existing.last_notified_occasion);
        let stored = ReminderPreferences {
            last_notified_occasion,
            updated_at: Some(Utc::now()),
            ..preferences
        };
        tables
            .preferences
            .insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<ReminderPreferences>, DbError> {
        Ok(self.tables.lock().await.preferences.get(user_id).cloned())
    }

    async fn find_reminder_candidates(
        &self,
    ) -> Result<Vec<(ReminderPreferences, SavedCity)>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .preferences
            .values()
            .filter(|p| p.is_enabled)
            .filter_map(|p| {
                tables
                    .cities
                    .get(&p.user_id)
                    .map(|city| (p.clone(), city.clone()))
            })
            .collect())
    }

    async fn claim_occasion(&self, user_id: &str, occasion: NaiveDate) -> Result<bool, DbError> {
        let mut tables = self.tables.lock().await;
        match tables.preferences.get_mut(user_id) {
            Some(preferences) if preferences.last_notified_occasion != Some(occasion) => {
                preferences.last_notified_occasion = Some(occasion);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryShabbatStore {
    async fn upsert_subscription(
        &self,
        subscription: SubscriptionPreference,
    ) -> Result<SubscriptionPreference, DbError> {
        let subscription = SubscriptionPreference {
            updated_at: Some(Utc::now()),
            ..subscription
        };
        self.tables
            .lock()
            .await
            .subscriptions
            .insert(subscription.user_id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn find_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionPreference>, DbError> {
        Ok(self.tables.lock().await.subscriptions.get(user_id).cloned())
    }

    async fn find_subscribers(&self) -> Result<Vec<Subscriber>, DbError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subscriptions
            .values()
            .filter(|s| s.subscribed_to_friday_email)
            .map(|s| Subscriber {
                user_id: s.user_id.clone(),
                email_address: tables
                    .preferences
                    .get(&s.user_id)
                    .and_then(|p| p.email_address())
                    .map(|e| e.as_str().to_string()),
                city: tables.cities.get(&s.user_id).cloned(),
            })
            .collect())
    }
}

#[async_trait]
impl TipRepository for MemoryShabbatStore {
    async fn list_tips(&self) -> Result<Vec<ShabbatTip>, DbError> {
        let mut tips = self.tables.lock().await.tips.clone();
        tips.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tips)
    }

    async fn add_tip(&self, content: &str, category: Option<&str>) -> Result<ShabbatTip, DbError> {
        let mut tables = self.tables.lock().await;
        tables.next_tip_id += 1;
        let tip = ShabbatTip {
            id: tables.next_tip_id,
            content: content.to_string(),
            category: category.map(str::to_string),
            created_at: Some(Utc::now()),
        };
        tables.tips.push(tip.clone());
        Ok(tip)
    }

    async fn delete_tip(&self, id: i64) -> Result<bool, DbError> {
        let mut tables = self.tables.lock().await;
        let before = tables.tips.len();
        tables.tips.retain(|tip| tip.id != id);
        Ok(tables.tips.len() < before)
    }
}

#[async_trait]
impl EmailLogRepository for MemoryShabbatStore {
    async fn append_log(&self, entry: EmailLogEntry) -> Result<(), DbError> {
        self.tables.lock().await.email_log.push(entry);
        Ok(())
    }
}

#[async_trait]
impl DeviceRegistrationRepository for MemoryShabbatStore {
    async fn register_device(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        let registration = DeviceRegistration {
            updated_at: Some(Utc::now()),
            ..registration
        };
        self.tables.lock().await.devices.insert(
            (registration.user_id.clone(), registration.device_id.clone()),
            registration.clone(),
        );
        Ok(registration)
    }

    async fn find_devices(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError> {
        Ok(self
            .tables
            .lock()
            .await
            .devices
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShabbatStore for MemoryShabbatStore {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shabbat_common::models::ChannelKind;

    #[tokio::test]
    async fn test_upsert_keeps_claimed_occasion() {
        let store = MemoryShabbatStore::new();
        store
            .upsert_preferences(ReminderPreferences::defaults("user_1"))
            .await
            .unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert!(store.claim_occasion("user_1", friday).await.unwrap());

        let changed = ReminderPreferences::from_parts(
            "user_1",
            30,
            &[ChannelKind::Push],
            None,
            None,
            true,
        )
        .unwrap();
        let stored = store.upsert_preferences(changed).await.unwrap();
        assert_eq!(stored.advance_minutes, 30);
        assert_eq!(stored.last_notified_occasion, Some(friday));
    }

    #[tokio::test]
    async fn test_claim_without_preferences_is_refused() {
        let store = MemoryShabbatStore::new();
        let friday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert!(!store.claim_occasion("nobody", friday).await.unwrap());
    }
}
