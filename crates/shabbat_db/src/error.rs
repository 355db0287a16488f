//! Error types for the store

use shabbat_common::ShabbatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database configuration error: {0}")]
    ConfigError(String),

    #[error("Database URL error: {0}")]
    UrlError(String),

    #[error("Database pool error: {0}")]
    PoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    /// A stored row no longer satisfies the domain invariants.
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

impl From<DbError> for ShabbatError {
    fn from(err: DbError) -> Self {
        ShabbatError::StoreError(err.to_string())
    }
}
