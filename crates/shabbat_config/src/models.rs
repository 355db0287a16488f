// --- File: crates/shabbat_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/shabbat.db, overridable via SHABBAT__DATABASE__URL
}

/// Which local day a reminder is allowed to fire on.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReminderDayRule {
    /// Fire on the Friday itself, in the minutes before candle lighting.
    #[default]
    OccasionDay,
    /// Fire only while "tomorrow" is Friday.
    DayBefore,
}

// --- Shabbat calculation and reminder cadence ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShabbatConfig {
    #[serde(default = "default_candle_lighting_offset")]
    pub candle_lighting_offset_minutes: i64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_reminder_window")]
    pub reminder_window_minutes: i64,
    #[serde(default)]
    pub reminder_day_rule: ReminderDayRule,
    /// TT - UT difference handed to the ephemeris, in seconds.
    #[serde(default = "default_delta_t")]
    pub delta_t_seconds: f64,
}

fn default_candle_lighting_offset() -> i64 {
    18
}

fn default_poll_interval() -> u64 {
    60
}

fn default_reminder_window() -> i64 {
    5
}

fn default_delta_t() -> f64 {
    69.0
}

impl Default for ShabbatConfig {
    fn default() -> Self {
        Self {
            candle_lighting_offset_minutes: default_candle_lighting_offset(),
            poll_interval_seconds: default_poll_interval(),
            reminder_window_minutes: default_reminder_window(),
            reminder_day_rule: ReminderDayRule::default(),
            delta_t_seconds: default_delta_t(),
        }
    }
}

// --- Transactional email (Resend compatible HTTP API) ---
// api_key is normally "secret_from_env" and resolved from EMAIL_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_url")]
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_unsubscribe_base_url")]
    pub unsubscribe_base_url: String,
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from_address() -> String {
    "noreply@shabbattimes.local".to_string()
}

fn default_unsubscribe_base_url() -> String {
    "https://shabbattimes.local/unsubscribe".to_string()
}

// --- Twilio Config ---
// auth_token is normally "secret_from_env" and resolved from TWILIO_AUTH_TOKEN.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
    /// Overrides https://api.twilio.com, mostly for tests.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

// --- Firebase Cloud Messaging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FirebaseConfig {
    pub project_id: Option<String>,
    pub key_path: Option<String>,
    /// Overrides https://fcm.googleapis.com, mostly for tests.
    #[serde(default)]
    pub api_base_url: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    /// IANA zone used for the "local" calendar rules and for displayed times.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default)]
    pub shabbat: ShabbatConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_email: bool,
    #[serde(default)]
    pub use_twilio: bool,
    #[serde(default)]
    pub use_firebase: bool,
    #[serde(default)]
    pub use_reminder_poller: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            time_zone: default_time_zone(),
            shabbat: ShabbatConfig::default(),
            use_email: false,
            use_twilio: false,
            use_firebase: false,
            use_reminder_poller: false,
            database: None,
            email: None,
            twilio: None,
            firebase: None,
        }
    }
}
