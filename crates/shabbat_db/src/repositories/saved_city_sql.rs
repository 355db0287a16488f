use async_trait::async_trait;
use shabbat_common::models::SavedCity;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::debug;

use super::{get_optional, now_text, parse_timestamp, query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::SavedCityRepository;

pub(crate) fn city_from_row(row: &AnyRow) -> Result<SavedCity, DbError> {
    Ok(SavedCity {
        user_id: row.try_get("user_id")?,
        city_name: row.try_get("city_name")?,
        country: row.try_get("country")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        updated_at: parse_timestamp(get_optional(row, "updated_at")?),
    })
}

#[async_trait]
impl SavedCityRepository for SqlShabbatStore {
    async fn upsert_city(&self, city: SavedCity) -> Result<SavedCity, DbError> {
        debug!("Saving city {} for user: {}", city.city_name, city.user_id);

        let updated_at = now_text();
        sqlx::query(
            r#"
            INSERT INTO saved_cities (user_id, city_name, country, latitude, longitude, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                city_name = excluded.city_name,
                country = excluded.country,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&city.user_id)
        .bind(&city.city_name)
        .bind(&city.country)
        .bind(city.latitude)
        .bind(city.longitude)
        .bind(&updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to save city", e))?;

        Ok(SavedCity {
            updated_at: parse_timestamp(Some(updated_at)),
            ..city
        })
    }

    async fn find_city(&self, user_id: &str) -> Result<Option<SavedCity>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, city_name, country, latitude, longitude, updated_at
            FROM saved_cities
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| query_error("Failed to load saved city", e))?;

        row.as_ref().map(city_from_row).transpose()
    }
}
