//! Persistence for the Shabbat times service
//!
//! Saved cities, reminder preferences, digest subscriptions, tips, push
//! device registrations and the email audit log. The SQL store runs over an
//! `sqlx::Any` pool, so SQLite (default) and PostgreSQL share one
//! implementation; select the driver with the `sqlite` / `postgres` features.
//!
//! ```rust,no_run
//! use shabbat_config::AppConfig;
//! use shabbat_db::open_store;
//!
//! async fn setup(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let store = open_store(config).await?;
//!     assert!(store.is_healthy().await);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod memory;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use factory::{open_store, StoreFactory};
pub use memory::MemoryShabbatStore;
pub use repositories::SqlShabbatStore;
pub use repository::{
    DeviceRegistrationRepository, EmailLogRepository, ReminderPreferencesRepository,
    SavedCityRepository, ShabbatStore, SubscriptionRepository, TipRepository,
};
