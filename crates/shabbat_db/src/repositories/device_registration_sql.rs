use async_trait::async_trait;
use shabbat_common::models::DeviceRegistration;
use sqlx::Row;
use tracing::info;

use super::{get_optional, now_text, parse_timestamp, query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::DeviceRegistrationRepository;

#[async_trait]
impl DeviceRegistrationRepository for SqlShabbatStore {
    async fn register_device(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        let updated_at = now_text();
        sqlx::query(
            r#"
            INSERT INTO device_registrations (user_id, device_id, registration_token, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, device_id) DO UPDATE SET
                registration_token = excluded.registration_token,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&registration.user_id)
        .bind(&registration.device_id)
        .bind(&registration.registration_token)
        .bind(&updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to register device", e))?;

        info!(
            "Device {} registered for user: {}",
            registration.device_id, registration.user_id
        );
        Ok(DeviceRegistration {
            updated_at: parse_timestamp(Some(updated_at)),
            ..registration
        })
    }

    async fn find_devices(&self, user_id: &str) -> Result<Vec<DeviceRegistration>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, device_id, registration_token, updated_at
            FROM device_registrations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| query_error("Failed to load devices", e))?;

        rows.iter()
            .map(|row| {
                Ok(DeviceRegistration {
                    user_id: row.try_get("user_id")?,
                    device_id: row.try_get("device_id")?,
                    registration_token: row.try_get("registration_token")?,
                    updated_at: parse_timestamp(get_optional(row, "updated_at")?),
                })
            })
            .collect()
    }
}
