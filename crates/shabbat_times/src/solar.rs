//! Solar Time Provider
//!
//! Sunrise, solar noon and sunset for a date and a pair of coordinates. The
//! default implementation runs the NREL SPA algorithm from
//! `solar-positioning` with the standard −0.833° sunrise/sunset horizon.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use solar_positioning::{spa, Horizon, SunriseResult};
use thiserror::Error;

/// ΔT (TT − UT) in seconds used when none is configured.
pub const DEFAULT_DELTA_T: f64 = 69.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolarError {
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Polar day or polar night.
    #[error("The sun does not set on {date} at latitude {latitude}")]
    NoSunset { date: NaiveDate, latitude: f64 },

    #[error("Solar computation failed: {0}")]
    Computation(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait SolarTimeProvider: Send + Sync {
    /// Sun times for the civil `date` at the given location, as UTC instants.
    fn sun_times_for(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<SunTimes, SolarError>;
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), SolarError> {
    let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(SolarError::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpaSolarProvider {
    delta_t: f64,
}

impl SpaSolarProvider {
    pub fn new(delta_t: f64) -> Self {
        Self { delta_t }
    }
}

impl Default for SpaSolarProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA_T)
    }
}

// SPA reports events as fractional hours relative to 0h UT of the requested
// date, wrapped into that UT day. Transit always lands on the local solar day
// of the requested date; sunrise and sunset may not.
fn to_instant(date: NaiveDate, day_offset: i64, hours: f64) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let millis = (hours * 3_600_000.0).round() as i64;
    midnight + Duration::days(day_offset) + Duration::milliseconds(millis)
}

impl SpaSolarProvider {
    /// Raw SPA events for the UT day `date`.
    fn spa_events(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<SunTimes, SolarError> {
        let result = spa::sunrise_sunset_utc_for_horizon(
            date.year(),
            date.month(),
            date.day(),
            latitude,
            longitude,
            self.delta_t,
            Horizon::SunriseSunset,
        )
        .map_err(|e| SolarError::Computation(e.to_string()))?;

        match result {
            SunriseResult::RegularDay {
                sunrise,
                transit,
                sunset,
            } => {
                let (rise_day, rise_hours) = sunrise.day_and_hours();
                let (noon_day, noon_hours) = transit.day_and_hours();
                let (set_day, set_hours) = sunset.day_and_hours();
                Ok(SunTimes {
                    sunrise: to_instant(date, rise_day as i64, rise_hours),
                    solar_noon: to_instant(date, noon_day as i64, noon_hours),
                    sunset: to_instant(date, set_day as i64, set_hours),
                })
            }
            SunriseResult::AllDay { .. } | SunriseResult::AllNight { .. } => {
                Err(SolarError::NoSunset { date, latitude })
            }
        }
    }
}

impl SolarTimeProvider for SpaSolarProvider {
    fn sun_times_for(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<SunTimes, SolarError> {
        validate_coordinates(latitude, longitude)?;

        let mut times = self.spa_events(date, latitude, longitude)?;
        // West of Greenwich the evening's sunset is wrapped back onto the
        // previous evening; east of it the morning's sunrise onto the next.
        if times.sunset < times.solar_noon {
            times.sunset = self
                .spa_events(date + Duration::days(1), latitude, longitude)?
                .sunset;
        }
        if times.sunrise > times.solar_noon {
            times.sunrise = self
                .spa_events(date - Duration::days(1), latitude, longitude)?
                .sunrise;
        }
        Ok(times)
    }
}
