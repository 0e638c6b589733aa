//! Calendar utilities shared by the streak engine and the statistics module.
//!
//! All functions are pure and operate on the UTC calendar. Three numbering
//! conventions coexist here and are not interchangeable:
//!
//! - [`weekday_index`] counts Monday = 0 .. Sunday = 6 (streak weekdays)
//! - [`sunday_weekday_index`] counts Sunday = 0 .. Saturday = 6 (daily histogram)
//! - [`this_week_range`] spans Sunday through Saturday

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Inclusive time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Whether `instant` falls inside the window, both ends included.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Canonical `YYYY-MM-DD` key of the UTC calendar date of `instant`.
pub fn date_key(instant: DateTime<Utc>) -> String {
    instant.format(DATE_KEY_FORMAT).to_string()
}

/// True iff `earlier` is the calendar day immediately before `later`.
///
/// `later` is pinned to 12:00 UTC before stepping back a day. An unparseable
/// `later` key yields `false`.
pub fn is_preceding_day(earlier: &str, later: &str) -> bool {
    let Ok(later_date) = NaiveDate::parse_from_str(later, DATE_KEY_FORMAT) else {
        return false;
    };
    let noon = later_date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(12);
    date_key(noon - Duration::days(1)) == earlier
}

/// Weekday of `instant` with Monday = 0 through Sunday = 6.
pub fn weekday_index(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_monday() as u8
}

/// Weekday of `instant` with Sunday = 0 through Saturday = 6.
pub fn sunday_weekday_index(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_sunday() as u8
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    NaiveDateTime::new(date, NaiveTime::MIN).and_utc()
}

/// Sunday 00:00:00.000 through the following Saturday 23:59:59.999.
pub fn this_week_range(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let start = start_of_day(sunday);
    DateRange {
        start,
        end: start + Duration::days(7) - Duration::milliseconds(1),
    }
}

/// First day 00:00:00 through last day 23:59:59 of the current month.
pub fn this_month_range(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(today.day0()));
    let next_first = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    DateRange {
        start: start_of_day(first),
        end: start_of_day(next_first) - Duration::seconds(1),
    }
}

/// January 1 00:00:00 through December 31 23:59:59 of the current year.
pub fn this_year_range(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    let jan_first = today - Duration::days(i64::from(today.ordinal0()));
    let next_jan_first = jan_first
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX);
    DateRange {
        start: start_of_day(jan_first),
        end: start_of_day(next_jan_first) - Duration::seconds(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).unwrap()
    }

    #[test]
    fn date_key_uses_utc_date() {
        assert_eq!(date_key(utc(2024, 3, 1, 0, 0, 0)), "2024-03-01");
        assert_eq!(date_key(utc(2024, 3, 1, 23, 59, 59)), "2024-03-01");
        assert_eq!(date_key(utc(2024, 12, 31, 23, 0, 0)), "2024-12-31");
    }

    #[test]
    fn preceding_day_across_boundaries() {
        assert!(is_preceding_day("2024-03-01", "2024-03-02"));
        assert!(is_preceding_day("2024-02-29", "2024-03-01"));
        assert!(is_preceding_day("2023-12-31", "2024-01-01"));
        assert!(is_preceding_day("2023-02-28", "2023-03-01"));
    }

    #[test]
    fn preceding_day_rejects_same_gap_and_future() {
        assert!(!is_preceding_day("2024-03-02", "2024-03-02"));
        assert!(!is_preceding_day("2024-02-28", "2024-03-01"));
        assert!(!is_preceding_day("2024-03-03", "2024-03-02"));
    }

    #[test]
    fn preceding_day_with_garbage_key_is_false() {
        assert!(!is_preceding_day("2024-03-01", "not-a-date"));
        assert!(!is_preceding_day("yesterday", "2024-03-02"));
    }

    #[test]
    fn weekday_index_counts_from_monday() {
        // 2024-03-04 is a Monday
        let expected = [0u8, 1, 2, 3, 4, 5, 6];
        for (offset, want) in expected.iter().enumerate() {
            let day = utc(2024, 3, 4 + offset as u32, 9, 0, 0);
            assert_eq!(weekday_index(day), *want, "day {day}");
        }
    }

    #[test]
    fn sunday_weekday_index_counts_from_sunday() {
        // 2024-03-03 is a Sunday
        let expected = [0u8, 1, 2, 3, 4, 5, 6];
        for (offset, want) in expected.iter().enumerate() {
            let day = utc(2024, 3, 3 + offset as u32, 9, 0, 0);
            assert_eq!(sunday_weekday_index(day), *want, "day {day}");
        }
    }

    #[test]
    fn conventions_disagree_on_sunday_and_saturday() {
        let sunday = utc(2024, 3, 3, 12, 0, 0);
        let saturday = utc(2024, 3, 2, 12, 0, 0);
        assert_eq!(weekday_index(sunday), 6);
        assert_eq!(sunday_weekday_index(sunday), 0);
        assert_eq!(weekday_index(saturday), 5);
        assert_eq!(sunday_weekday_index(saturday), 6);
    }

    #[test]
    fn week_range_is_sunday_anchored() {
        // Wednesday 2024-03-06
        let range = this_week_range(utc(2024, 3, 6, 15, 30, 0));
        assert_eq!(range.start, utc(2024, 3, 3, 0, 0, 0));
        assert_eq!(
            range.end,
            utc(2024, 3, 9, 23, 59, 59) + Duration::milliseconds(999)
        );
    }

    #[test]
    fn week_range_on_sunday_starts_same_day() {
        let range = this_week_range(utc(2024, 3, 3, 0, 0, 0));
        assert_eq!(range.start, utc(2024, 3, 3, 0, 0, 0));
    }

    #[test]
    fn week_range_on_saturday_ends_same_day() {
        let range = this_week_range(utc(2024, 3, 9, 23, 0, 0));
        assert_eq!(range.start, utc(2024, 3, 3, 0, 0, 0));
        assert!(range.contains(utc(2024, 3, 9, 23, 59, 59)));
        assert!(!range.contains(utc(2024, 3, 10, 0, 0, 0)));
    }

    #[test]
    fn month_range_handles_leap_february() {
        let range = this_month_range(utc(2024, 2, 14, 8, 0, 0));
        assert_eq!(range.start, utc(2024, 2, 1, 0, 0, 0));
        assert_eq!(range.end, utc(2024, 2, 29, 23, 59, 59));
    }

    #[test]
    fn month_range_in_december() {
        let range = this_month_range(utc(2023, 12, 31, 23, 59, 59));
        assert_eq!(range.start, utc(2023, 12, 1, 0, 0, 0));
        assert_eq!(range.end, utc(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn year_range_spans_calendar_year() {
        let range = this_year_range(utc(2024, 7, 4, 12, 0, 0));
        assert_eq!(range.start, utc(2024, 1, 1, 0, 0, 0));
        assert_eq!(range.end, utc(2024, 12, 31, 23, 59, 59));
    }

    #[test]
    fn range_contains_is_inclusive() {
        let range = this_month_range(utc(2024, 3, 10, 0, 0, 0));
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(range.end + Duration::seconds(1)));
        assert!(!range.contains(range.start - Duration::seconds(1)));
    }
}
