//! Reminder Decision Engine
//!
//! A reminder goes out when `now` is inside the window that ends at
//! `candle_lighting - advance_minutes`, on a day the configured
//! [`ReminderDayRule`] allows. The persisted `last_notified_occasion` marker is
//! claimed before anything is sent, so each user hears about an occasion at
//! most once even with several pollers running.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use shabbat_common::models::{ReminderPreferences, SavedCity};
use shabbat_common::services::ReminderNotice;
use shabbat_common::ShabbatError;
use shabbat_config::{ReminderDayRule, ShabbatConfig};
use shabbat_db::{ReminderPreferencesRepository, SavedCityRepository, ShabbatStore};
use shabbat_times::format::format_time;
use shabbat_times::OccasionCalculator;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dispatcher::{DeliveryDispatcher, DispatchReport};

/// When, relative to the occasion, a reminder may fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderRule {
    /// Width of the firing window before the reminder instant.
    pub window: Duration,
    pub day_rule: ReminderDayRule,
    /// Wall clock the day rule is evaluated in.
    pub tz: Tz,
}

impl ReminderRule {
    pub fn new(window: Duration, day_rule: ReminderDayRule, tz: Tz) -> Self {
        Self {
            window,
            day_rule,
            tz,
        }
    }

    pub fn from_config(config: &ShabbatConfig, tz: Tz) -> Self {
        Self::new(
            Duration::minutes(config.reminder_window_minutes),
            config.reminder_day_rule,
            tz,
        )
    }

    /// The Friday a reminder at `now` would be about, if the day rule allows one.
    ///
    /// `OccasionDay` accepts local today, or local yesterday when it was
    /// Friday: west of the display zone the evening's sunset can fall on the
    /// next local date. `DayBefore` only accepts a local tomorrow that is Friday.
    pub fn occasion_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        let today = now.with_timezone(&self.tz).date_naive();
        let is_friday = |d: &NaiveDate| d.weekday() == Weekday::Fri;
        match self.day_rule {
            ReminderDayRule::OccasionDay => Some(today)
                .filter(is_friday)
                .or_else(|| Some(today - Duration::days(1)).filter(is_friday)),
            ReminderDayRule::DayBefore => Some(today + Duration::days(1)).filter(is_friday),
        }
    }

    /// `true` iff the user is enabled, the day rule holds, and the reminder
    /// instant (`candle_lighting - advance`) is more than zero and at most
    /// `window` ahead of `now`.
    pub fn should_fire(
        &self,
        now: DateTime<Utc>,
        preferences: &ReminderPreferences,
        candle_lighting: DateTime<Utc>,
    ) -> bool {
        if !preferences.is_enabled || self.occasion_date(now).is_none() {
            return false;
        }
        let lead = (candle_lighting - preferences.advance()) - now;
        lead > Duration::zero() && lead <= self.window
    }
}

/// What one evaluation of a user decided.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderOutcome {
    NoPreferences,
    NoCity,
    Disabled,
    NotOccasionDay,
    OutsideWindow,
    AlreadyNotified,
    Fired(DispatchReport),
}

impl ReminderOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderOutcome::NoPreferences => "no_preferences",
            ReminderOutcome::NoCity => "no_city",
            ReminderOutcome::Disabled => "disabled",
            ReminderOutcome::NotOccasionDay => "not_occasion_day",
            ReminderOutcome::OutsideWindow => "outside_window",
            ReminderOutcome::AlreadyNotified => "already_notified",
            ReminderOutcome::Fired(_) => "fired",
        }
    }
}

/// Counts from one sweep over all candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub fired: usize,
    pub errors: usize,
}

pub struct ReminderService {
    store: Arc<dyn ShabbatStore>,
    calculator: OccasionCalculator,
    dispatcher: DeliveryDispatcher,
    rule: ReminderRule,
    offset_minutes: i64,
}

impl ReminderService {
    pub fn new(
        store: Arc<dyn ShabbatStore>,
        calculator: OccasionCalculator,
        dispatcher: DeliveryDispatcher,
        rule: ReminderRule,
        offset_minutes: i64,
    ) -> Self {
        Self {
            store,
            calculator,
            dispatcher,
            rule,
            offset_minutes,
        }
    }

    pub fn rule(&self) -> &ReminderRule {
        &self.rule
    }

    /// Evaluates one user against `now`, dispatching if the reminder is due.
    pub async fn check_and_send_reminders(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReminderOutcome, ShabbatError> {
        let Some(preferences) = self.store.find_preferences(user_id).await? else {
            return Ok(ReminderOutcome::NoPreferences);
        };
        let Some(city) = self.store.find_city(user_id).await? else {
            return Ok(ReminderOutcome::NoCity);
        };
        self.evaluate(&preferences, &city, now).await
    }

    /// One pass over every enabled user with a saved city. A failing user is
    /// logged and counted; the sweep carries on.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepSummary, ShabbatError> {
        let candidates = self.store.find_reminder_candidates().await?;
        let mut summary = SweepSummary::default();

        for (preferences, city) in &candidates {
            summary.evaluated += 1;
            match self.evaluate(preferences, city, now).await {
                Ok(ReminderOutcome::Fired(_)) => summary.fired += 1,
                Ok(outcome) => debug!("User {}: {}", preferences.user_id, outcome.as_str()),
                Err(e) => {
                    warn!("Reminder check for user {} failed: {}", preferences.user_id, e);
                    summary.errors += 1;
                }
            }
        }

        if summary.fired > 0 || summary.errors > 0 {
            info!(
                "Reminder sweep: {} evaluated, {} fired, {} errors",
                summary.evaluated, summary.fired, summary.errors
            );
        }
        Ok(summary)
    }

    async fn evaluate(
        &self,
        preferences: &ReminderPreferences,
        city: &SavedCity,
        now: DateTime<Utc>,
    ) -> Result<ReminderOutcome, ShabbatError> {
        if !preferences.is_enabled {
            return Ok(ReminderOutcome::Disabled);
        }
        let Some(date) = self.rule.occasion_date(now) else {
            return Ok(ReminderOutcome::NotOccasionDay);
        };
        if preferences.last_notified_occasion == Some(date) {
            return Ok(ReminderOutcome::AlreadyNotified);
        }

        let occasion = self.calculator.occasion_for_date(
            date,
            city.latitude,
            city.longitude,
            self.offset_minutes,
        )?;
        if !self.rule.should_fire(now, preferences, occasion.candle_lighting) {
            return Ok(ReminderOutcome::OutsideWindow);
        }

        if !self.store.claim_occasion(&preferences.user_id, date).await? {
            debug!("Occasion {} already claimed for user {}", date, preferences.user_id);
            return Ok(ReminderOutcome::AlreadyNotified);
        }

        let notice = ReminderNotice::new(
            city.city_name.as_str(),
            format_time(occasion.candle_lighting, self.calculator.tz()),
        );
        let report = self
            .dispatcher
            .dispatch(&preferences.user_id, &preferences.channels, &notice)
            .await;
        info!(
            "Reminder for {} sent to user {}: {} of {} channels delivered",
            date,
            preferences.user_id,
            report.delivered.len(),
            report.attempted()
        );
        Ok(ReminderOutcome::Fired(report))
    }
}

impl std::fmt::Debug for ReminderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderService")
            .field("rule", &self.rule)
            .field("offset_minutes", &self.offset_minutes)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
