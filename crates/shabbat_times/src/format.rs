//! Display formatting for times and dates, in the configured wall clock.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::occasion::Occasion;

/// "05:54 PM"
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%I:%M %p").to_string()
}

/// "Friday, March 15, 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormattedTimes {
    pub date: String,
    pub sunset: String,
    pub candle_lighting: String,
}

impl FormattedTimes {
    pub fn for_occasion(occasion: &Occasion, tz: Tz) -> Self {
        Self {
            date: format_date(occasion.date),
            sunset: format_time(occasion.sunset, tz),
            candle_lighting: format_time(occasion.candle_lighting, tz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(format_date(date), "Friday, March 15, 2024");

        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 22, 12, 0).unwrap();
        assert_eq!(format_time(instant, Tz::America__New_York), "06:12 PM");
        assert_eq!(format_time(instant, Tz::UTC), "10:12 PM");
    }
}
