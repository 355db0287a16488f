use async_trait::async_trait;
use shabbat_common::models::ShabbatTip;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

use super::{get_optional, now_text, parse_timestamp, query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::TipRepository;

fn tip_from_row(row: &AnyRow) -> Result<ShabbatTip, DbError> {
    Ok(ShabbatTip {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        category: get_optional(row, "category")?,
        created_at: parse_timestamp(get_optional(row, "created_at")?),
    })
}

#[async_trait]
impl TipRepository for SqlShabbatStore {
    async fn list_tips(&self) -> Result<Vec<ShabbatTip>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, content, category, created_at
            FROM shabbat_tips
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| query_error("Failed to list tips", e))?;

        rows.iter().map(tip_from_row).collect()
    }

    async fn add_tip(&self, content: &str, category: Option<&str>) -> Result<ShabbatTip, DbError> {
        debug!("Adding tip in category {:?}", category);

        let row = sqlx::query(
            r#"
            INSERT INTO shabbat_tips (content, category, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, content, category, created_at
            "#,
        )
        .bind(content)
        .bind(category.map(str::to_string))
        .bind(now_text())
        .fetch_one(self.pool())
        .await
        .map_err(|e| query_error("Failed to insert tip", e))?;

        let tip = tip_from_row(&row)?;
        info!("Tip {} created", tip.id);
        Ok(tip)
    }

    async fn delete_tip(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM shabbat_tips WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| query_error("Failed to delete tip", e))?;

        Ok(result.rows_affected() > 0)
    }
}
