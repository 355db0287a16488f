use chrono_tz::Tz;
use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;
pub use models::*;
pub use config::ConfigError;

/// Marker value replaced by an environment variable named after the key path.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Loads the configuration from `config/default`, `config/{RUN_ENV}` and the
/// `SHABBAT__*` environment, then resolves secrets and validates the result.
///
/// The directory can be moved with `CONFIG_DIR`, the env prefix with `PREFIX`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    load_config_from(&config_dir)
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "SHABBAT".to_string());

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    let config = apply_env_overrides_from_marker(raw_config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the invariants the rest of the service relies on.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    config.tz()?;

    let shabbat = &config.shabbat;
    if shabbat.candle_lighting_offset_minutes < 0 {
        return Err(ConfigError::Message(
            "shabbat.candle_lighting_offset_minutes must not be negative".to_string(),
        ));
    }
    if shabbat.poll_interval_seconds == 0 {
        return Err(ConfigError::Message(
            "shabbat.poll_interval_seconds must be positive".to_string(),
        ));
    }
    // A window narrower than the poll interval can be stepped over entirely.
    let window_seconds = shabbat.reminder_window_minutes.saturating_mul(60);
    if window_seconds <= shabbat.poll_interval_seconds as i64 {
        return Err(ConfigError::Message(format!(
            "shabbat.reminder_window_minutes ({}) must be wider than poll_interval_seconds ({})",
            shabbat.reminder_window_minutes, shabbat.poll_interval_seconds
        )));
    }
    Ok(())
}

impl AppConfig {
    /// The configured wall-clock zone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Message(format!("invalid time_zone '{}': {}", self.time_zone, e)))
    }
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = secret_env_key(&path);
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => warn!("env var {} not found for {}", env_key, SECRET_MARKER),
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// `["email", "api_key"]` becomes `EMAIL_API_KEY`.
pub fn secret_env_key(path: &[String]) -> String {
    path.join("_").to_uppercase()
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|e| ConfigError::Message(format!("config is not serializable: {e}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|e| ConfigError::Message(format!("config no longer deserializes: {e}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads `.env` (or `DOTENV_OVERRIDE`, or a `.env*` first CLI argument) once per process.
///
/// Returns the path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            "#,
        );
        assert_eq!(config.time_zone, "UTC");
        assert_eq!(config.shabbat.candle_lighting_offset_minutes, 18);
        assert_eq!(config.shabbat.poll_interval_seconds, 60);
        assert_eq!(config.shabbat.reminder_window_minutes, 5);
        assert_eq!(config.shabbat.reminder_day_rule, ReminderDayRule::OccasionDay);
        assert!(!config.use_email);
        assert!(config.database.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_day_rule_parses_snake_case() {
        let config = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            [shabbat]
            reminder_day_rule = "day_before"
            "#,
        );
        assert_eq!(config.shabbat.reminder_day_rule, ReminderDayRule::DayBefore);
    }

    #[test]
    fn test_window_must_exceed_poll_interval() {
        let mut config = AppConfig::default();
        config.shabbat.poll_interval_seconds = 300;
        config.shabbat.reminder_window_minutes = 5;
        assert!(validate_config(&config).is_err());

        config.shabbat.poll_interval_seconds = 299;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_time_zone_is_rejected() {
        let config = AppConfig {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..AppConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_secret_marker_is_resolved_from_env() {
        env::set_var("EMAIL_API_KEY", "re_test_key");
        let config = AppConfig {
            email: Some(EmailConfig {
                api_url: "https://api.resend.com/emails".to_string(),
                api_key: SECRET_MARKER.to_string(),
                from_address: "noreply@shabbattimes.local".to_string(),
                unsubscribe_base_url: "https://shabbattimes.local/unsubscribe".to_string(),
            }),
            ..AppConfig::default()
        };

        let resolved = apply_env_overrides_from_marker(config).unwrap();
        assert_eq!(resolved.email.unwrap().api_key, "re_test_key");
    }

    #[test]
    fn test_secret_env_key_joins_path() {
        let path = vec!["twilio".to_string(), "auth_token".to_string()];
        assert_eq!(secret_env_key(&path), "TWILIO_AUTH_TOKEN");
    }
}
