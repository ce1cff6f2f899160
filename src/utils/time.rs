//! Date helpers for working out which schedule day a run targets

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

/// Calendar date `offset_days` after the local date of `now`
pub fn schedule_date<Z: TimeZone>(now: &DateTime<Z>, offset_days: i64) -> Option<NaiveDate> {
    now.date_naive()
        .checked_add_signed(Duration::try_days(offset_days)?)
}

/// ISO `yyyy-MM-dd`, the only date format used on the wire and in reports
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_schedule_date_uses_local_calendar_day() {
        // 02:00 UTC on June 1st is still May 31st in Seattle
        let now = Utc
            .with_ymd_and_hms(2024, 6, 1, 2, 0, 0)
            .unwrap()
            .with_timezone(&Los_Angeles);

        assert_eq!(
            schedule_date(&now, 2),
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }

    #[test]
    fn test_schedule_date_crosses_month_end() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(schedule_date(&now, 1), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(schedule_date(&now, 0), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(iso_date(date), "2024-06-01");
    }
}
