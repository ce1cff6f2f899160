//! Cron utility functions for calculating next scheduled times
//!
//! Expressions use the `cron` crate syntax with a leading seconds field:
//! `sec min hour day-of-month month day-of-week [year]`.

use chrono::{DateTime, TimeZone};
use cron::Schedule;
use std::str::FromStr;

/// Parse a cron expression, describing the failure on error
pub fn parse_schedule(cron_expression: &str) -> Result<Schedule, String> {
    Schedule::from_str(cron_expression)
        .map_err(|e| format!("Invalid cron expression '{cron_expression}': {e}"))
}

/// Next fire time strictly after `after`, evaluated in `after`'s time zone
pub fn next_fire_time<Z: TimeZone>(schedule: &Schedule, after: &DateTime<Z>) -> Option<DateTime<Z>> {
    schedule.after(after).next()
}

/// Calculate the next scheduled time from a cron expression in zone `tz`
///
/// # Returns
/// * `Some(DateTime<Z>)` - The next scheduled time if the expression is valid
/// * `None` - If the cron expression is invalid or has no future schedules
pub fn calculate_next_scheduled_time<Z: TimeZone>(cron_expression: &str, tz: &Z) -> Option<DateTime<Z>> {
    parse_schedule(cron_expression)
        .ok()
        .and_then(|schedule| schedule.upcoming(tz.clone()).next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_valid_cron_expression() {
        let result = calculate_next_scheduled_time("0 0 15 * * *", &Utc);
        assert!(result.is_some());

        let next_time = result.unwrap();
        assert!(next_time > Utc::now());
        assert_eq!(next_time.hour(), 15);
    }

    #[test]
    fn test_invalid_cron_expression() {
        assert!(calculate_next_scheduled_time("invalid", &Utc).is_none());

        let err = parse_schedule("invalid").unwrap_err();
        assert!(err.contains("Invalid cron expression"));
    }

    #[test]
    fn test_next_fire_time_respects_time_zone() {
        let schedule = parse_schedule("0 15 13 * * *").unwrap();
        let after = Los_Angeles.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap();

        let next = next_fire_time(&schedule, &after).unwrap();
        assert_eq!(next, Los_Angeles.with_ymd_and_hms(2024, 6, 2, 13, 15, 0).unwrap());
    }
}
