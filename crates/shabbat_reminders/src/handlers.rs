use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shabbat_common::models::{ChannelKind, ReminderPreferences, SubscriptionPreference};
use shabbat_common::{validation_error, FieldError, ShabbatError};
use shabbat_db::{ReminderPreferencesRepository, ShabbatStore, SubscriptionRepository};
use std::sync::Arc;
use tracing::info;

use crate::engine::{ReminderOutcome, ReminderService};

#[derive(Clone)]
pub struct RemindersState {
    pub store: Arc<dyn ShabbatStore>,
    pub service: Arc<ReminderService>,
}

/// The flat form the client submits and reads back.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderPreferencesBody {
    pub advance_minutes: u32,
    pub channels: Vec<ChannelKind>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notified_occasion: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ReminderPreferences> for ReminderPreferencesBody {
    fn from(preferences: &ReminderPreferences) -> Self {
        Self {
            advance_minutes: preferences.advance_minutes,
            channels: preferences.channel_kinds(),
            phone_number: preferences.phone_number().map(|p| p.as_str().to_string()),
            email_address: preferences.email_address().map(|e| e.as_str().to_string()),
            is_enabled: preferences.is_enabled,
            last_notified_occasion: preferences.last_notified_occasion,
            updated_at: preferences.updated_at,
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderPreferencesRequest {
    pub advance_minutes: i64,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ReminderPreferencesRequest {
    /// Validates the whole form, collecting every field problem.
    pub fn into_preferences(self, user_id: String) -> Result<ReminderPreferences, ShabbatError> {
        let mut errors = Vec::new();
        let mut kinds = Vec::with_capacity(self.channels.len());
        for raw in &self.channels {
            match raw.parse::<ChannelKind>() {
                Ok(kind) => kinds.push(kind),
                Err(message) => errors.push(FieldError::new("channels", message)),
            }
        }

        match ReminderPreferences::from_parts(
            user_id,
            self.advance_minutes,
            &kinds,
            self.phone_number.as_deref(),
            self.email_address.as_deref(),
            self.is_enabled,
        ) {
            Ok(preferences) if errors.is_empty() => Ok(preferences),
            Ok(_) => Err(validation_error(errors)),
            Err(mut field_errors) => {
                errors.append(&mut field_errors);
                Err(validation_error(errors))
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionBody {
    pub subscribed_to_friday_email: bool,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReminderCheckResponse {
    pub outcome: String,
    pub delivered: Vec<ChannelKind>,
    pub failed: Vec<String>,
}

impl From<ReminderOutcome> for ReminderCheckResponse {
    fn from(outcome: ReminderOutcome) -> Self {
        let label = outcome.as_str().to_string();
        match outcome {
            ReminderOutcome::Fired(report) => Self {
                outcome: label,
                delivered: report.delivered_channels(),
                failed: report.failed.iter().map(ToString::to_string).collect(),
            },
            _ => Self {
                outcome: label,
                delivered: Vec::new(),
                failed: Vec::new(),
            },
        }
    }
}

/// Stored reminder preferences, or the first-use defaults.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/users/{user_id}/reminders",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    responses((status = 200, description = "Reminder preferences", body = ReminderPreferencesBody)),
    tag = "Reminders"
))]
pub async fn get_reminders_handler(
    State(state): State<Arc<RemindersState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ReminderPreferencesBody>, ShabbatError> {
    let preferences = state
        .store
        .find_preferences(&user_id)
        .await?
        .unwrap_or_else(|| ReminderPreferences::defaults(user_id));
    Ok(Json(ReminderPreferencesBody::from(&preferences)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/users/{user_id}/reminders",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    request_body = ReminderPreferencesRequest,
    responses(
        (status = 200, description = "Preferences saved", body = ReminderPreferencesBody),
        (status = 400, description = "Field-level validation errors; nothing saved")
    ),
    tag = "Reminders"
))]
pub async fn put_reminders_handler(
    State(state): State<Arc<RemindersState>>,
    Path(user_id): Path<String>,
    Json(request): Json<ReminderPreferencesRequest>,
) -> Result<Json<ReminderPreferencesBody>, ShabbatError> {
    let preferences = request.into_preferences(user_id)?;
    let saved = state.store.upsert_preferences(preferences).await?;
    info!(
        "User {} saved reminders: {:?}, {} minutes ahead",
        saved.user_id,
        saved.channel_kinds(),
        saved.advance_minutes
    );
    Ok(Json(ReminderPreferencesBody::from(&saved)))
}

/// Evaluates the user's reminder right now, sending it if due.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/users/{user_id}/reminders/check",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    responses(
        (status = 200, description = "What the engine decided", body = ReminderCheckResponse),
        (status = 422, description = "No sunset at the saved city today")
    ),
    tag = "Reminders"
))]
pub async fn check_reminders_handler(
    State(state): State<Arc<RemindersState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ReminderCheckResponse>, ShabbatError> {
    let outcome = state
        .service
        .check_and_send_reminders(&user_id, Utc::now())
        .await?;
    Ok(Json(outcome.into()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/users/{user_id}/subscription",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    responses((status = 200, description = "Digest subscription", body = SubscriptionBody)),
    tag = "Reminders"
))]
pub async fn get_subscription_handler(
    State(state): State<Arc<RemindersState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SubscriptionBody>, ShabbatError> {
    let subscribed = state
        .store
        .find_subscription(&user_id)
        .await?
        .is_some_and(|s| s.subscribed_to_friday_email);
    Ok(Json(SubscriptionBody {
        subscribed_to_friday_email: subscribed,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/users/{user_id}/subscription",
    params(("user_id" = String, Path, description = "Anonymous user id")),
    request_body = SubscriptionBody,
    responses((status = 200, description = "Subscription saved", body = SubscriptionBody)),
    tag = "Reminders"
))]
pub async fn put_subscription_handler(
    State(state): State<Arc<RemindersState>>,
    Path(user_id): Path<String>,
    Json(body): Json<SubscriptionBody>,
) -> Result<Json<SubscriptionBody>, ShabbatError> {
    let saved = state
        .store
        .upsert_subscription(SubscriptionPreference {
            user_id,
            subscribed_to_friday_email: body.subscribed_to_friday_email,
            updated_at: None,
        })
        .await?;
    info!(
        "User {} digest subscription: {}",
        saved.user_id, saved.subscribed_to_friday_email
    );
    Ok(Json(SubscriptionBody {
        subscribed_to_friday_email: saved.subscribed_to_friday_email,
    }))
}
