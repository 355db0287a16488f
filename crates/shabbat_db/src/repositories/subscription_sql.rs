use async_trait::async_trait;
use shabbat_common::models::{SavedCity, Subscriber, SubscriptionPreference};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, warn};

use super::{get_optional, now_text, parse_timestamp, query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::SubscriptionRepository;

fn subscriber_from_row(row: &AnyRow) -> Result<Subscriber, DbError> {
    let user_id: String = row.try_get("user_id")?;
    let city_name: Option<String> = get_optional(row, "city_name")?;
    let latitude: Option<f64> = get_optional(row, "latitude")?;
    let longitude: Option<f64> = get_optional(row, "longitude")?;
    let city = match (city_name, latitude, longitude) {
        (Some(city_name), Some(latitude), Some(longitude)) => Some(SavedCity {
            user_id: user_id.clone(),
            city_name,
            country: get_optional::<String>(row, "country")?.unwrap_or_default(),
            latitude,
            longitude,
            updated_at: parse_timestamp(get_optional(row, "city_updated_at")?),
        }),
        _ => None,
    };
    Ok(Subscriber {
        user_id,
        email_address: get_optional(row, "email_address")?,
        city,
    })
}

#[async_trait]
impl SubscriptionRepository for SqlShabbatStore {
    async fn upsert_subscription(
        &self,
        subscription: SubscriptionPreference,
    ) -> Result<SubscriptionPreference, DbError> {
        debug!(
            "Saving digest subscription ({}) for user: {}",
            subscription.subscribed_to_friday_email, subscription.user_id
        );

        let updated_at = now_text();
        sqlx::query(
            r#"
            INSERT INTO user_subscription_preferences (user_id, subscribed_to_friday_email, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                subscribed_to_friday_email = excluded.subscribed_to_friday_email,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&subscription.user_id)
        .bind(i64::from(subscription.subscribed_to_friday_email))
        .bind(&updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to save subscription", e))?;

        Ok(SubscriptionPreference {
            updated_at: parse_timestamp(Some(updated_at)),
            ..subscription
        })
    }

    async fn find_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionPreference>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, subscribed_to_friday_email, updated_at
            FROM user_subscription_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| query_error("Failed to load subscription", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let subscribed: i64 = row.try_get("subscribed_to_friday_email")?;
        Ok(Some(SubscriptionPreference {
            user_id: row.try_get("user_id")?,
            subscribed_to_friday_email: subscribed != 0,
            updated_at: parse_timestamp(get_optional(&row, "updated_at")?),
        }))
    }

    async fn find_subscribers(&self) -> Result<Vec<Subscriber>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT s.user_id, p.email_address,
                   c.city_name, c.country, c.latitude, c.longitude, c.updated_at AS city_updated_at
            FROM user_subscription_preferences s
            LEFT JOIN user_reminder_preferences p ON p.user_id = s.user_id
            LEFT JOIN saved_cities c ON c.user_id = s.user_id
            WHERE s.subscribed_to_friday_email = 1
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| query_error("Failed to load subscribers", e))?;

        let mut subscribers = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for row in &rows {
            match subscriber_from_row(row) {
                Ok(subscriber) => subscribers.push(subscriber),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping unreadable subscriber row: {}", e);
                }
            }
        }
        if skipped > 0 {
            warn!("{} subscriber row(s) skipped", skipped);
        }
        Ok(subscribers)
    }
}
