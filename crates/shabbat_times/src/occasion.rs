//! Occasion Calculator
//!
//! Picks the Friday a request is about and derives its sunset and
//! candle-lighting instants. Two end-of-Shabbat markers exist on purpose:
//! [`Occasion::sunset`] (same evening, shown by the live view) and
//! [`OccasionCalculator::havdalah`] (next evening's sunset, used by the digest).

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use shabbat_common::ShabbatError;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::solar::{SolarError, SolarTimeProvider, SpaSolarProvider};

pub const DEFAULT_CANDLE_LIGHTING_OFFSET: i64 = 18;

/// Local hour from which a Friday counts as already begun.
pub const FRIDAY_ROLLOVER_HOUR: u32 = 18;

const FRIDAY_FROM_SUNDAY: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OccasionError {
    #[error(transparent)]
    Solar(#[from] SolarError),

    #[error("Candle-lighting offset must not be negative, got {0}")]
    NegativeOffset(i64),
}

impl From<OccasionError> for ShabbatError {
    fn from(err: OccasionError) -> Self {
        match err {
            OccasionError::Solar(_) => ShabbatError::GeoComputationError(err.to_string()),
            OccasionError::NegativeOffset(_) => ShabbatError::InvalidArgument(err.to_string()),
        }
    }
}

/// The Friday a request at `now` refers to, in `now`'s own time zone.
///
/// The soonest Friday on or after today, except that a Friday from 18:00 on
/// rolls to the following week.
pub fn next_occasion_date<T: TimeZone>(now: &DateTime<T>) -> NaiveDate {
    let today = now.date_naive();
    let weekday = now.weekday().num_days_from_sunday();
    let mut days_until = (FRIDAY_FROM_SUNDAY + 7 - weekday) % 7;
    if days_until == 0 && now.hour() >= FRIDAY_ROLLOVER_HOUR {
        days_until = 7;
    }
    today + Duration::days(i64::from(days_until))
}

/// `sunset` moved `offset_minutes` earlier.
pub fn candle_lighting(
    sunset: DateTime<Utc>,
    offset_minutes: i64,
) -> Result<DateTime<Utc>, OccasionError> {
    if offset_minutes < 0 {
        return Err(OccasionError::NegativeOffset(offset_minutes));
    }
    Ok(sunset - Duration::minutes(offset_minutes))
}

/// Derived times for one Friday at one location. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Occasion {
    pub date: NaiveDate,
    pub sunset: DateTime<Utc>,
    pub candle_lighting: DateTime<Utc>,
    pub offset_minutes: i64,
}

#[derive(Clone)]
pub struct OccasionCalculator {
    provider: Arc<dyn SolarTimeProvider>,
    tz: Tz,
}

impl OccasionCalculator {
    pub fn new(provider: Arc<dyn SolarTimeProvider>, tz: Tz) -> Self {
        Self { provider, tz }
    }

    /// Calculator over the SPA provider.
    pub fn spa(delta_t: f64, tz: Tz) -> Self {
        Self::new(Arc::new(SpaSolarProvider::new(delta_t)), tz)
    }

    /// Wall clock used for the Friday rule and for display.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn occasion_times(
        &self,
        latitude: f64,
        longitude: f64,
        offset_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<Occasion, OccasionError> {
        let date = next_occasion_date(&now.with_timezone(&self.tz));
        self.occasion_for_date(date, latitude, longitude, offset_minutes)
    }

    /// Times for an explicit `date`, without applying the Friday rule.
    pub fn occasion_for_date(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        offset_minutes: i64,
    ) -> Result<Occasion, OccasionError> {
        if offset_minutes < 0 {
            return Err(OccasionError::NegativeOffset(offset_minutes));
        }
        let sun = self.provider.sun_times_for(date, latitude, longitude)?;
        debug!(
            "Sunset for {} at ({}, {}) is {}",
            date, latitude, longitude, sun.sunset
        );
        Ok(Occasion {
            date,
            sunset: sun.sunset,
            candle_lighting: candle_lighting(sun.sunset, offset_minutes)?,
            offset_minutes,
        })
    }

    /// Sunset of the day after `date`.
    pub fn havdalah(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<DateTime<Utc>, OccasionError> {
        let saturday = date + Duration::days(1);
        Ok(self
            .provider
            .sun_times_for(saturday, latitude, longitude)?
            .sunset)
    }
}

impl std::fmt::Debug for OccasionCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccasionCalculator")
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}
