use async_trait::async_trait;
use shabbat_common::models::EmailLogEntry;

use super::{query_error, SqlShabbatStore};
use crate::error::DbError;
use crate::repository::EmailLogRepository;

#[async_trait]
impl EmailLogRepository for SqlShabbatStore {
    async fn append_log(&self, entry: EmailLogEntry) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO email_log (user_id, email_address, status, error_message, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.email_address)
        .bind(entry.status.as_str())
        .bind(entry.error_message.clone())
        .bind(entry.sent_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| query_error("Failed to append email log", e))?;
        Ok(())
    }
}
