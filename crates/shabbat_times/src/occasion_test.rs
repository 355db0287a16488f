#[cfg(test)]
mod tests {
    use crate::occasion::{candle_lighting, next_occasion_date, OccasionCalculator, OccasionError};
    use crate::solar::{MockSolarTimeProvider, SolarError, SunTimes};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use shabbat_common::{HttpStatusCode, ShabbatError};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sun_times_with_sunset(sunset: chrono::DateTime<Utc>) -> SunTimes {
        SunTimes {
            sunrise: sunset - Duration::hours(14),
            solar_noon: sunset - Duration::hours(7),
            sunset,
        }
    }

    #[test]
    fn test_midweek_goes_to_coming_friday() {
        // Wednesday
        let now = Tz::Europe__Paris.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
        assert_eq!(next_occasion_date(&now), date(2024, 6, 14));
    }

    #[test]
    fn test_friday_before_rollover_is_today() {
        let now = Tz::Europe__Paris.with_ymd_and_hms(2024, 6, 14, 17, 59, 59).unwrap();
        assert_eq!(next_occasion_date(&now), date(2024, 6, 14));
    }

    #[test]
    fn test_friday_from_six_pm_rolls_a_week() {
        let now = Tz::Europe__Paris.with_ymd_and_hms(2024, 6, 14, 18, 0, 0).unwrap();
        assert_eq!(next_occasion_date(&now), date(2024, 6, 21));
    }

    #[test]
    fn test_weekend_goes_to_next_friday() {
        let saturday = Tz::UTC.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let sunday = Tz::UTC.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap();
        assert_eq!(next_occasion_date(&saturday), date(2024, 6, 21));
        assert_eq!(next_occasion_date(&sunday), date(2024, 6, 21));
    }

    #[test]
    fn test_local_clock_decides_the_rollover() {
        // Friday 17:30 UTC is 20:30 in Jerusalem and 10:30 in Los Angeles
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 17, 30, 0).unwrap();
        assert_eq!(next_occasion_date(&now), date(2024, 6, 14));
        let jerusalem = now.with_timezone(&Tz::Asia__Jerusalem);
        assert_eq!(next_occasion_date(&jerusalem), date(2024, 6, 21));
        let los_angeles = now.with_timezone(&Tz::America__Los_Angeles);
        assert_eq!(next_occasion_date(&los_angeles), date(2024, 6, 14));
    }

    #[test]
    fn test_candle_lighting_offsets() {
        let sunset = Utc.with_ymd_and_hms(2024, 6, 14, 19, 57, 0).unwrap();
        assert_eq!(candle_lighting(sunset, 0).unwrap(), sunset);
        assert_eq!(
            candle_lighting(sunset, 18).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 14, 19, 39, 0).unwrap()
        );
        assert_eq!(
            candle_lighting(sunset, -1).unwrap_err(),
            OccasionError::NegativeOffset(-1)
        );
    }

    #[test]
    fn test_paris_candle_lighting_is_eighteen_minutes_before_sunset() {
        let sunset = Utc.with_ymd_and_hms(2024, 6, 14, 19, 56, 41).unwrap();
        let mut provider = MockSolarTimeProvider::new();
        provider
            .expect_sun_times_for()
            .withf(|d, lat, lon| {
                *d == NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
                    && (*lat - 48.8566).abs() < 1e-9
                    && (*lon - 2.3522).abs() < 1e-9
            })
            .times(1)
            .returning(move |_, _, _| Ok(sun_times_with_sunset(sunset)));

        let calculator = OccasionCalculator::new(Arc::new(provider), Tz::Europe__Paris);
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 8, 0, 0).unwrap();
        let occasion = calculator
            .occasion_times(48.8566, 2.3522, 18, now)
            .unwrap();

        assert_eq!(occasion.date, date(2024, 6, 14));
        assert_eq!(occasion.sunset, sunset);
        assert_eq!(occasion.sunset - occasion.candle_lighting, Duration::minutes(18));
        assert_eq!(occasion.offset_minutes, 18);
    }

    #[test]
    fn test_havdalah_uses_next_day_sunset() {
        let saturday_sunset = Utc.with_ymd_and_hms(2024, 6, 15, 19, 57, 0).unwrap();
        let mut provider = MockSolarTimeProvider::new();
        provider
            .expect_sun_times_for()
            .withf(|d, _, _| *d == NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .times(1)
            .returning(move |_, _, _| Ok(sun_times_with_sunset(saturday_sunset)));

        let calculator = OccasionCalculator::new(Arc::new(provider), Tz::Europe__Paris);
        let havdalah = calculator
            .havdalah(date(2024, 6, 14), 48.8566, 2.3522)
            .unwrap();
        assert_eq!(havdalah, saturday_sunset);
    }

    #[test]
    fn test_missing_sunset_is_a_geo_error() {
        let mut provider = MockSolarTimeProvider::new();
        provider.expect_sun_times_for().returning(|d, lat, _| {
            Err(SolarError::NoSunset {
                date: d,
                latitude: lat,
            })
        });

        let calculator = OccasionCalculator::new(Arc::new(provider), Tz::UTC);
        let err = calculator
            .occasion_for_date(date(2024, 6, 21), 78.2, 15.6, 18)
            .unwrap_err();
        let shabbat_err: ShabbatError = err.into();
        assert!(matches!(shabbat_err, ShabbatError::GeoComputationError(_)));
        assert_eq!(shabbat_err.status_code(), 422);
    }

    #[test]
    fn test_negative_offset_never_reaches_provider() {
        let mut provider = MockSolarTimeProvider::new();
        provider.expect_sun_times_for().times(0);
        let calculator = OccasionCalculator::new(Arc::new(provider), Tz::UTC);
        let err = calculator
            .occasion_for_date(date(2024, 6, 21), 48.0, 2.0, -5)
            .unwrap_err();
        assert_eq!(err, OccasionError::NegativeOffset(-5));
    }
}
