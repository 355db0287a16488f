//! SQL store tests against an in-memory SQLite database.

use chrono::NaiveDate;
use shabbat_common::models::{
    ChannelKind, DeliveryStatus, DeviceRegistration, EmailLogEntry, ReminderPreferences,
    SavedCity, SubscriptionPreference,
};
use shabbat_config::DatabaseConfig;
use shabbat_db::{
    DbClient, DeviceRegistrationRepository, EmailLogRepository, ReminderPreferencesRepository,
    SavedCityRepository, ShabbatStore, SqlShabbatStore, StoreFactory, SubscriptionRepository,
    TipRepository,
};
use std::sync::Arc;

async fn open_memory_store() -> Arc<dyn ShabbatStore> {
    StoreFactory::new()
        .from_db_config(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        })
        .await
        .expect("in-memory sqlite store")
}

async fn open_raw_store() -> (DbClient, SqlShabbatStore) {
    let client = DbClient::from_url("sqlite::memory:")
        .await
        .expect("in-memory sqlite client");
    let store = SqlShabbatStore::new(client.clone());
    store.init_schema().await.expect("schema");
    (client, store)
}

async fn subscribe(store: &dyn ShabbatStore, user_id: &str) {
    store
        .upsert_subscription(SubscriptionPreference {
            user_id: user_id.to_string(),
            subscribed_to_friday_email: true,
            updated_at: None,
        })
        .await
        .unwrap();
}

fn paris(user_id: &str) -> SavedCity {
    SavedCity {
        user_id: user_id.to_string(),
        city_name: "Paris".to_string(),
        country: "France".to_string(),
        latitude: 48.8566,
        longitude: 2.3522,
        updated_at: None,
    }
}

fn email_preferences(user_id: &str, address: &str) -> ReminderPreferences {
    ReminderPreferences::from_parts(
        user_id,
        15,
        &[ChannelKind::Push, ChannelKind::Email],
        None,
        Some(address),
        true,
    )
    .expect("valid preferences")
}

#[tokio::test]
async fn test_city_upsert_overwrites() {
    let store = open_memory_store().await;
    store.upsert_city(paris("user_1")).await.unwrap();

    let mut london = paris("user_1");
    london.city_name = "London".to_string();
    london.country = "United Kingdom".to_string();
    london.latitude = 51.5074;
    london.longitude = -0.1278;
    store.upsert_city(london).await.unwrap();

    let found = store.find_city("user_1").await.unwrap().unwrap();
    assert_eq!(found.city_name, "London");
    assert!((found.latitude - 51.5074).abs() < 1e-9);
    assert!(found.updated_at.is_some());
    assert!(store.find_city("user_2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_preferences_round_trip_through_flat_columns() {
    let store = open_memory_store().await;
    let saved = store
        .upsert_preferences(email_preferences("user_1", "a@b.co"))
        .await
        .unwrap();

    assert_eq!(saved.advance_minutes, 15);
    assert_eq!(
        saved.channel_kinds(),
        vec![ChannelKind::Push, ChannelKind::Email]
    );
    assert_eq!(saved.email_address().map(|e| e.as_str()), Some("a@b.co"));
    assert!(saved.phone_number().is_none());
    assert!(saved.last_notified_occasion.is_none());
}

#[tokio::test]
async fn test_claim_occasion_is_at_most_once() {
    let store = open_memory_store().await;
    store
        .upsert_preferences(ReminderPreferences::defaults("user_1"))
        .await
        .unwrap();

    let friday = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
    let next_friday = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();

    assert!(store.claim_occasion("user_1", friday).await.unwrap());
    assert!(!store.claim_occasion("user_1", friday).await.unwrap());
    assert!(store.claim_occasion("user_1", next_friday).await.unwrap());

    // saving preferences again must not reopen the claimed occasion
    let saved = store
        .upsert_preferences(ReminderPreferences::defaults("user_1"))
        .await
        .unwrap();
    assert_eq!(saved.last_notified_occasion, Some(next_friday));
    assert!(!store.claim_occasion("user_1", next_friday).await.unwrap());
}

#[tokio::test]
async fn test_candidates_need_city_and_enabled_flag() {
    let store = open_memory_store().await;

    store
        .upsert_preferences(ReminderPreferences::defaults("with_city"))
        .await
        .unwrap();
    store.upsert_city(paris("with_city")).await.unwrap();

    store
        .upsert_preferences(ReminderPreferences::defaults("no_city"))
        .await
        .unwrap();

    let mut disabled = ReminderPreferences::defaults("disabled");
    disabled.is_enabled = false;
    store.upsert_preferences(disabled).await.unwrap();
    store.upsert_city(paris("disabled")).await.unwrap();

    let candidates = store.find_reminder_candidates().await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].0.user_id, "with_city");
    assert_eq!(candidates[0].1.city_name, "Paris");
}

#[tokio::test]
async fn test_subscribers_carry_email_and_city() {
    let store = open_memory_store().await;

    store
        .upsert_subscription(SubscriptionPreference {
            user_id: "complete".to_string(),
            subscribed_to_friday_email: true,
            updated_at: None,
        })
        .await
        .unwrap();
    store
        .upsert_preferences(email_preferences("complete", "c@d.org"))
        .await
        .unwrap();
    store.upsert_city(paris("complete")).await.unwrap();

    store
        .upsert_subscription(SubscriptionPreference {
            user_id: "bare".to_string(),
            subscribed_to_friday_email: true,
            updated_at: None,
        })
        .await
        .unwrap();
    store
        .upsert_subscription(SubscriptionPreference {
            user_id: "opted_out".to_string(),
            subscribed_to_friday_email: false,
            updated_at: None,
        })
        .await
        .unwrap();

    let mut subscribers = store.find_subscribers().await.unwrap();
    subscribers.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    assert_eq!(subscribers.len(), 2);

    assert_eq!(subscribers[0].user_id, "bare");
    assert!(subscribers[0].email_address.is_none());
    assert!(subscribers[0].city.is_none());

    assert_eq!(subscribers[1].email_address.as_deref(), Some("c@d.org"));
    assert_eq!(
        subscribers[1].city.as_ref().map(|c| c.city_name.as_str()),
        Some("Paris")
    );
}

#[tokio::test]
async fn test_tips_newest_first_and_delete() {
    let store = open_memory_store().await;
    let first = store.add_tip("Prepare meals ahead", Some("food")).await.unwrap();
    let second = store.add_tip("Set up lights before sunset", None).await.unwrap();

    let tips = store.list_tips().await.unwrap();
    assert_eq!(tips.len(), 2);
    assert_eq!(tips[0].id, second.id);
    assert_eq!(tips[1].category.as_deref(), Some("food"));

    assert!(store.delete_tip(first.id).await.unwrap());
    assert!(!store.delete_tip(first.id).await.unwrap());
    assert_eq!(store.list_tips().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_email_log_and_devices() {
    let store = open_memory_store().await;

    store
        .append_log(EmailLogEntry::failed("user_1", "a@b.co", "Email delivery failed"))
        .await
        .unwrap();
    let success = EmailLogEntry::success("user_1", "a@b.co");
    assert_eq!(success.status, DeliveryStatus::Success);
    store.append_log(success).await.unwrap();

    store
        .register_device(DeviceRegistration::new(
            "user_1".into(),
            "phone".into(),
            "token-1".into(),
        ))
        .await
        .unwrap();
    store
        .register_device(DeviceRegistration::new(
            "user_1".into(),
            "phone".into(),
            "token-2".into(),
        ))
        .await
        .unwrap();

    let devices = store.find_devices("user_1").await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].registration_token, "token-2");
    assert!(store.is_healthy().await);
}

#[tokio::test]
async fn test_null_columns_read_back_as_none() {
    let store = open_memory_store().await;
    store
        .upsert_preferences(ReminderPreferences::defaults("push_only"))
        .await
        .unwrap();

    let found = store.find_preferences("push_only").await.unwrap().unwrap();
    assert_eq!(found.channel_kinds(), vec![ChannelKind::Push]);
    assert!(found.phone_number().is_none());
    assert!(found.email_address().is_none());
    assert!(found.last_notified_occasion.is_none());
    assert!(found.updated_at.is_some());

    let tip = store.add_tip("Light candles early", None).await.unwrap();
    let tips = store.list_tips().await.unwrap();
    assert_eq!(tips[0].id, tip.id);
    assert!(tips[0].category.is_none());
}

#[tokio::test]
async fn test_push_only_subscriber_keeps_contact_email() {
    let store = open_memory_store().await;
    subscribe(store.as_ref(), "push_only").await;
    store
        .upsert_preferences(
            ReminderPreferences::from_parts(
                "push_only",
                10,
                &[ChannelKind::Push],
                None,
                Some("a@b.com"),
                true,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    store.upsert_city(paris("push_only")).await.unwrap();

    let subscribers = store.find_subscribers().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email_address.as_deref(), Some("a@b.com"));
    assert!(subscribers[0].city.is_some());
}

#[tokio::test]
async fn test_unreadable_candidate_row_is_skipped() {
    let (client, store) = open_raw_store().await;
    store
        .upsert_preferences(ReminderPreferences::defaults("good"))
        .await
        .unwrap();
    store.upsert_city(paris("good")).await.unwrap();
    store.upsert_city(paris("broken")).await.unwrap();
    client
        .execute(
            "INSERT INTO user_reminder_preferences \
             (user_id, advance_minutes, channels, is_enabled, updated_at) \
             VALUES ('broken', 15, 'fax', 1, '2024-03-15T00:00:00Z')",
        )
        .await
        .unwrap();

    let candidates = store.find_reminder_candidates().await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].0.user_id, "good");
}

#[tokio::test]
async fn test_unreadable_subscriber_row_is_skipped() {
    let (client, store) = open_raw_store().await;
    subscribe(&store, "good").await;
    store
        .upsert_preferences(email_preferences("good", "g@h.io"))
        .await
        .unwrap();
    store.upsert_city(paris("good")).await.unwrap();

    subscribe(&store, "broken").await;
    client
        .execute(
            "INSERT INTO saved_cities \
             (user_id, city_name, country, latitude, longitude, updated_at) \
             VALUES ('broken', 'Nowhere', 'None', 'north', 'east', '2024-03-15T00:00:00Z')",
        )
        .await
        .unwrap();

    let subscribers = store.find_subscribers().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].user_id, "good");
    assert_eq!(subscribers[0].email_address.as_deref(), Some("g@h.io"));
}
