//! SQL implementation of the store contracts
//!
//! Each table's repository lives in its own module; all of them are
//! implemented on [`SqlShabbatStore`]. Timestamps are kept as RFC 3339 TEXT
//! because `sqlx::Any` cannot decode `DateTime<Utc>` directly.

mod device_registration_sql;
mod email_log_sql;
mod reminder_preferences_sql;
mod saved_city_sql;
mod subscription_sql;
mod tips_sql;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::ShabbatStore;
use crate::DbClient;

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS saved_cities (
        user_id TEXT PRIMARY KEY,
        city_name TEXT NOT NULL,
        country TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_reminder_preferences (
        user_id TEXT PRIMARY KEY,
        advance_minutes INTEGER NOT NULL,
        channels TEXT NOT NULL,
        phone_number TEXT,
        email_address TEXT,
        is_enabled INTEGER NOT NULL,
        last_notified_occasion TEXT,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_subscription_preferences (
        user_id TEXT PRIMARY KEY,
        subscribed_to_friday_email INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shabbat_tips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        category TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS email_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        email_address TEXT NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        sent_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS device_registrations (
        user_id TEXT NOT NULL,
        device_id TEXT NOT NULL,
        registration_token TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, device_id)
    )
    "#,
];

/// SQL-backed store over a [`DbClient`].
#[derive(Debug, Clone)]
pub struct SqlShabbatStore {
    db_client: DbClient,
}

impl SqlShabbatStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub(crate) fn pool(&self) -> &sqlx::Pool<sqlx::Any> {
        self.db_client.pool()
    }
}

#[async_trait]
impl ShabbatStore for SqlShabbatStore {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }
        info!("Schema initialized successfully");
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.db_client.is_healthy().await
    }
}

/// Reads a nullable column. The `Any` driver rejects NULL when decoding
/// straight into `Option<T>`, so NULL is checked on the raw value first.
pub(crate) fn get_optional<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, DbError>
where
    T: sqlx::Decode<'r, sqlx::Any> + sqlx::Type<sqlx::Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    Ok(Some(row.try_get(column)?))
}

pub(crate) fn now_text() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

pub(crate) fn query_error(context: &str, e: sqlx::Error) -> DbError {
    tracing::error!("{}: {}", context, e);
    DbError::QueryError(e.to_string())
}
