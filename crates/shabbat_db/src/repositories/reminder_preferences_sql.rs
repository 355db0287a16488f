use async_trait::async_trait;
use chrono::NaiveDate;
use shabbat_common::models::{ChannelKind, ReminderPreferences, SavedCity};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info, warn};

use super::{get_optional, now_text, parse_date, parse_timestamp, query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::ReminderPreferencesRepository;

const TABLE: &str = "user_reminder_preferences";

fn encode_channels(preferences: &ReminderPreferences) -> String {
    preferences
        .channel_kinds()
        .iter()
        .map(ChannelKind::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_channels(raw: &str) -> Result<Vec<ChannelKind>, DbError> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<ChannelKind>().map_err(|message| DbError::CorruptRow {
                table: TABLE,
                message,
            })
        })
        .collect()
}

fn preferences_from_row(row: &AnyRow) -> Result<ReminderPreferences, DbError> {
    let user_id: String = row.try_get("user_id")?;
    let advance_minutes: i64 = row.try_get("advance_minutes")?;
    let channels: String = row.try_get("channels")?;
    let phone_number: Option<String> = get_optional(row, "phone_number")?;
    let email_address: Option<String> = get_optional(row, "email_address")?;
    let is_enabled: i64 = row.try_get("is_enabled")?;

    let mut preferences = ReminderPreferences::from_parts(
        user_id,
        advance_minutes,
        &decode_channels(&channels)?,
        phone_number.as_deref(),
        email_address.as_deref(),
        is_enabled != 0,
    )
    .map_err(|errors| DbError::CorruptRow {
        table: TABLE,
        message: errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    })?;
    preferences.last_notified_occasion = parse_date(get_optional(row, "last_notified_occasion")?);
    preferences.updated_at = parse_timestamp(get_optional(row, "updated_at")?);
    Ok(preferences)
}

fn candidate_from_row(row: &AnyRow) -> Result<(ReminderPreferences, SavedCity), DbError> {
    let preferences = preferences_from_row(row)?;
    let city = SavedCity {
        user_id: preferences.user_id.clone(),
        city_name: row.try_get("city_name")?,
        country: row.try_get("country")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        updated_at: parse_timestamp(get_optional(row, "city_updated_at")?),
    };
    Ok((preferences, city))
}

#[async_trait]
impl ReminderPreferencesRepository for SqlShabbatStore {
    async fn upsert_preferences(
        &self,
        preferences: ReminderPreferences,
    ) -> Result<ReminderPreferences, DbError> {
        debug!("Saving reminder preferences for user: {}", preferences.user_id);

        let updated_at = now_text();
        sqlx::query(
            r#"
            INSERT INTO user_reminder_preferences
                (user_id, advance_minutes, channels, phone_number, email_address, is_enabled, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                advance_minutes = excluded.advance_minutes,
                channels = excluded.channels,
                phone_number = excluded.phone_number,
                email_address = excluded.email_address,
                is_enabled = excluded.is_enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&preferences.user_id)
        .bind(i64::from(preferences.advance_minutes))
        .bind(encode_channels(&preferences))
        .bind(preferences.phone_number().map(|p| p.as_str().to_string()))
        .bind(preferences.email_address().map(|e| e.as_str().to_string()))
        .bind(i64::from(preferences.is_enabled))
        .bind(&updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to save reminder preferences", e))?;

        // re-read so the caller sees the preserved last_notified_occasion
        self.find_preferences(&preferences.user_id)
            .await?
            .ok_or_else(|| DbError::QueryError("Saved preferences vanished".to_string()))
    }

    async fn find_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<ReminderPreferences>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, advance_minutes, channels, phone_number, email_address,
                   is_enabled, last_notified_occasion, updated_at
            FROM user_reminder_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| query_error("Failed to load reminder preferences", e))?;

        row.as_ref().map(preferences_from_row).transpose()
    }

    async fn find_reminder_candidates(
        &self,
    ) -> Result<Vec<(ReminderPreferences, SavedCity)>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT p.user_id, p.advance_minutes, p.channels, p.phone_number, p.email_address,
                   p.is_enabled, p.last_notified_occasion, p.updated_at,
                   c.city_name, c.country, c.latitude, c.longitude,
                   c.updated_at AS city_updated_at
            FROM user_reminder_preferences p
            JOIN saved_cities c ON c.user_id = p.user_id
            WHERE p.is_enabled = 1
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| query_error("Failed to load reminder candidates", e))?;

        let mut candidates = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for row in &rows {
            match candidate_from_row(row) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    skipped += 1;
                    warn!("Skipping unreadable reminder candidate: {}", e);
                }
            }
        }
        if skipped > 0 {
            warn!("{} reminder candidate row(s) skipped", skipped);
        }
        Ok(candidates)
    }

    async fn claim_occasion(&self, user_id: &str, occasion: NaiveDate) -> Result<bool, DbError> {
        let occasion = occasion.format("%Y-%m-%d").to_string();
        let result = sqlx::query(
            r#"
            UPDATE user_reminder_preferences
            SET last_notified_occasion = $1
            WHERE user_id = $2
              AND (last_notified_occasion IS NULL OR last_notified_occasion <> $3)
            "#,
        )
        .bind(&occasion)
        .bind(user_id)
        .bind(&occasion)
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to claim occasion", e))?;

        let claimed = result.rows_affected() == 1;
        if claimed {
            info!("Claimed occasion {} for user: {}", occasion, user_id);
        }
        Ok(claimed)
    }
}
