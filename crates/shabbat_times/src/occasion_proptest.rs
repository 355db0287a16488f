#[cfg(test)]
mod tests {
    use crate::occasion::{candle_lighting, next_occasion_date, FRIDAY_ROLLOVER_HOUR};
    use chrono::{Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    const ZONES: [Tz; 4] = [
        Tz::UTC,
        Tz::America__New_York,
        Tz::Europe__Paris,
        Tz::Australia__Sydney,
    ];

    proptest! {
        #[test]
        fn test_result_is_the_soonest_eligible_friday(
            secs in 1_500_000_000i64..2_000_000_000i64,
            zone in 0..ZONES.len(),
        ) {
            let now = Utc.timestamp_opt(secs, 0).unwrap().with_timezone(&ZONES[zone]);
            let friday = next_occasion_date(&now);
            let today = now.date_naive();

            prop_assert_eq!(friday.weekday(), Weekday::Fri);
            prop_assert!(friday >= today);

            let days_ahead = (friday - today).num_days();
            prop_assert!(days_ahead <= 7);
            if days_ahead == 7 {
                prop_assert_eq!(today.weekday(), Weekday::Fri);
                prop_assert!(now.hour() >= FRIDAY_ROLLOVER_HOUR);
            }
            if days_ahead == 0 {
                prop_assert!(now.hour() < FRIDAY_ROLLOVER_HOUR);
            }
        }

        #[test]
        fn test_result_is_stable_at_its_own_midnight(days in 0i64..20_000) {
            let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(days);
            let midnight = Tz::UTC
                .from_local_datetime(&start.and_hms_opt(0, 0, 0).unwrap())
                .unwrap();
            let friday = next_occasion_date(&midnight);
            let friday_midnight = Tz::UTC
                .from_local_datetime(&friday.and_hms_opt(0, 0, 0).unwrap())
                .unwrap();
            prop_assert_eq!(next_occasion_date(&friday_midnight), friday);
        }

        #[test]
        fn test_candle_lighting_decreases_with_offset(
            secs in 1_500_000_000i64..2_000_000_000i64,
            a in 0i64..180,
            b in 0i64..180,
        ) {
            let sunset = Utc.timestamp_opt(secs, 0).unwrap();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let early = candle_lighting(sunset, high).unwrap();
            let late = candle_lighting(sunset, low).unwrap();
            prop_assert!(early <= late);
            prop_assert!(late <= sunset);
            prop_assert_eq!(candle_lighting(sunset, 0).unwrap(), sunset);
        }
    }
}
