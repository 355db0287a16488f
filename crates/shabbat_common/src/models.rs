// --- File: crates/shabbat_common/src/models.rs ---

//! Domain records shared by the store, the reminder engine and the digest job.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").expect("valid phone pattern"));

/// The user's saved location. One per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SavedCity {
    pub user_id: String,
    pub city_name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The three delivery channels a reminder can go out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Push,
    Email,
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Push => "push",
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(ChannelKind::Push),
            "email" => Ok(ChannelKind::Email),
            "sms" => Ok(ChannelKind::Sms),
            other => Err(format!("Unknown notification channel '{}'", other)),
        }
    }
}

/// An email address that matched the address pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new(
                "email_address",
                "Email is required for email notifications",
            ));
        }
        if !EMAIL_PATTERN.is_match(trimmed) {
            return Err(FieldError::new("email_address", "Invalid email address"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A phone number that matched the (loose) international pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new(
                "phone_number",
                "Phone number is required for SMS notifications",
            ));
        }
        if !PHONE_PATTERN.is_match(trimmed) {
            return Err(FieldError::new("phone_number", "Invalid phone number"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A selected channel together with the contact detail it needs.
///
/// An `Email` or `Sms` channel cannot exist without a pattern-valid address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderChannel {
    Push,
    Email(EmailAddress),
    Sms(PhoneNumber),
}

impl ReminderChannel {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ReminderChannel::Push => ChannelKind::Push,
            ReminderChannel::Email(_) => ChannelKind::Email,
            ReminderChannel::Sms(_) => ChannelKind::Sms,
        }
    }

    /// Where a sender should deliver: the address, the number, or the user id
    /// whose registered devices receive the push.
    pub fn target<'a>(&'a self, user_id: &'a str) -> &'a str {
        match self {
            ReminderChannel::Push => user_id,
            ReminderChannel::Email(address) => address.as_str(),
            ReminderChannel::Sms(number) => number.as_str(),
        }
    }
}

pub const DEFAULT_ADVANCE_MINUTES: u32 = 10;

/// Per-user reminder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderPreferences {
    pub user_id: String,
    pub advance_minutes: u32,
    pub channels: Vec<ReminderChannel>,
    /// Valid contact details, kept even when their channel is not selected;
    /// the digest reads the email address from here.
    pub contact_email: Option<EmailAddress>,
    pub contact_phone: Option<PhoneNumber>,
    pub is_enabled: bool,
    /// The last occasion a reminder was dispatched for.
    pub last_notified_occasion: Option<NaiveDate>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReminderPreferences {
    /// First-use defaults: ten minutes ahead, push only, enabled.
    pub fn defaults(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            advance_minutes: DEFAULT_ADVANCE_MINUTES,
            channels: vec![ReminderChannel::Push],
            contact_email: None,
            contact_phone: None,
            is_enabled: true,
            last_notified_occasion: None,
            updated_at: None,
        }
    }

    /// Builds preferences from the flat stored/submitted form.
    ///
    /// Every problem is reported, not just the first. Details for a channel
    /// that is not selected are only kept when they are valid.
    pub fn from_parts(
        user_id: impl Into<String>,
        advance_minutes: i64,
        channels: &[ChannelKind],
        phone_number: Option<&str>,
        email_address: Option<&str>,
        is_enabled: bool,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let advance = match u32::try_from(advance_minutes) {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                errors.push(FieldError::new(
                    "advance_minutes",
                    "Advance minutes must be a positive number",
                ));
                0
            }
        };

        let email = EmailAddress::parse(email_address.unwrap_or_default());
        let phone = PhoneNumber::parse(phone_number.unwrap_or_default());

        let mut built = Vec::with_capacity(channels.len());
        for kind in channels {
            if built.iter().any(|c: &ReminderChannel| c.kind() == *kind) {
                continue;
            }
            let channel = match kind {
                ChannelKind::Push => Ok(ReminderChannel::Push),
                ChannelKind::Email => email.clone().map(ReminderChannel::Email),
                ChannelKind::Sms => phone.clone().map(ReminderChannel::Sms),
            };
            match channel {
                Ok(channel) => built.push(channel),
                Err(field) => errors.push(field),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            user_id: user_id.into(),
            advance_minutes: advance,
            channels: built,
            contact_email: email.ok(),
            contact_phone: phone.ok(),
            is_enabled,
            last_notified_occasion: None,
            updated_at: None,
        })
    }

    pub fn advance(&self) -> Duration {
        Duration::minutes(i64::from(self.advance_minutes))
    }

    pub fn channel_kinds(&self) -> Vec<ChannelKind> {
        self.channels.iter().map(ReminderChannel::kind).collect()
    }

    pub fn email_address(&self) -> Option<&EmailAddress> {
        self.contact_email.as_ref()
    }

    pub fn phone_number(&self) -> Option<&PhoneNumber> {
        self.contact_phone.as_ref()
    }
}

/// Whether the user wants the Friday digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionPreference {
    pub user_id: String,
    pub subscribed_to_friday_email: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An admin-managed tip shown in the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShabbatTip {
    pub id: i64,
    pub content: String,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A digest subscriber joined with the contact and location it needs.
/// Either may be missing; the digest skips such rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    pub user_id: String,
    pub email_address: Option<String>,
    pub city: Option<SavedCity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(DeliveryStatus::Success),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(format!("Unknown delivery status '{}'", other)),
        }
    }
}

/// One row of the append-only email audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub user_id: String,
    pub email_address: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl EmailLogEntry {
    pub fn success(user_id: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email_address: email_address.into(),
            status: DeliveryStatus::Success,
            error_message: None,
            sent_at: Utc::now(),
        }
    }

    pub fn failed(
        user_id: impl Into<String>,
        email_address: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email_address: email_address.into(),
            status: DeliveryStatus::Failed,
            error_message: Some(error_message.into()),
            sent_at: Utc::now(),
        }
    }
}

/// A push registration token for one of the user's devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeviceRegistration {
    pub user_id: String,
    pub device_id: String,
    pub registration_token: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeviceRegistration {
    pub fn new(user_id: String, device_id: String, registration_token: String) -> Self {
        Self {
            user_id,
            device_id,
            registration_token,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_without_phone_is_rejected() {
        let errors = ReminderPreferences::from_parts(
            "user_1",
            10,
            &[ChannelKind::Sms],
            Some(""),
            None,
            true,
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(
                "phone_number",
                "Phone number is required for SMS notifications"
            )]
        );
    }

    #[test]
    fn test_all_problems_are_reported() {
        let errors = ReminderPreferences::from_parts(
            "user_1",
            0,
            &[ChannelKind::Email, ChannelKind::Sms],
            Some("12"),
            Some("not-an-address"),
            true,
        )
        .unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Advance minutes must be a positive number",
                "Invalid email address",
                "Invalid phone number"
            ]
        );
    }

    #[test]
    fn test_valid_preferences_keep_contact_details() {
        let prefs = ReminderPreferences::from_parts(
            "user_1",
            15,
            &[ChannelKind::Push, ChannelKind::Email, ChannelKind::Sms, ChannelKind::Push],
            Some("+1 (555) 010-2030"),
            Some(" a@b.com "),
            true,
        )
        .unwrap();
        assert_eq!(prefs.channels.len(), 3);
        assert_eq!(prefs.email_address().map(EmailAddress::as_str), Some("a@b.com"));
        assert_eq!(
            prefs.phone_number().map(PhoneNumber::as_str),
            Some("+1 (555) 010-2030")
        );
        assert_eq!(prefs.advance(), Duration::minutes(15));
    }

    #[test]
    fn test_valid_email_is_kept_without_email_channel() {
        let prefs = ReminderPreferences::from_parts(
            "user_1",
            10,
            &[ChannelKind::Push],
            None,
            Some("a@b.com"),
            true,
        )
        .unwrap();
        assert_eq!(prefs.channel_kinds(), vec![ChannelKind::Push]);
        assert_eq!(prefs.email_address().map(EmailAddress::as_str), Some("a@b.com"));
        assert!(prefs.phone_number().is_none());
    }

    #[test]
    fn test_unselected_channel_details_are_not_validated() {
        let prefs = ReminderPreferences::from_parts(
            "user_1",
            5,
            &[ChannelKind::Push],
            Some("garbage"),
            Some("garbage"),
            false,
        )
        .unwrap();
        assert!(prefs.email_address().is_none());
        assert!(prefs.phone_number().is_none());
    }

    #[test]
    fn test_defaults() {
        let prefs = ReminderPreferences::defaults("user_1");
        assert_eq!(prefs.advance_minutes, 10);
        assert_eq!(prefs.channel_kinds(), vec![ChannelKind::Push]);
        assert!(prefs.is_enabled);
    }

    #[test]
    fn test_channel_kind_parsing() {
        assert_eq!("SMS".parse::<ChannelKind>(), Ok(ChannelKind::Sms));
        assert!("pigeon".parse::<ChannelKind>().is_err());
    }
}
