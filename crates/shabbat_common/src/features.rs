//! Runtime feature flags.
//!
//! A channel is live only when its `use_*` flag is set AND its config section
//! is present. Anything else leaves the channel without a sender, and sends on
//! it fail with `DeliveryError::ChannelUnavailable`.

use shabbat_config::AppConfig;

/// `true` when the flag is on and the section exists.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_email_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_email, config.email.as_ref())
}

pub fn is_twilio_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_twilio, config.twilio.as_ref())
}

pub fn is_firebase_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_firebase, config.firebase.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shabbat_config::FirebaseConfig;

    #[test]
    fn test_flag_without_section_is_disabled() {
        let config = AppConfig {
            use_firebase: true,
            ..AppConfig::default()
        };
        assert!(!is_firebase_enabled(&config));

        let config = AppConfig {
            use_firebase: true,
            firebase: Some(FirebaseConfig::default()),
            ..AppConfig::default()
        };
        assert!(is_firebase_enabled(&config));
        assert!(!is_email_enabled(&config));
        assert!(!is_twilio_enabled(&config));
    }
}
