//! Business-day arithmetic for SLA accounting.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// True for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts business days elapsed from `start` to `end`.
///
/// Both endpoint days are considered, then one is subtracted so the start
/// day itself does not count as elapsed time: a request opened Monday and
/// checked Tuesday has 1 elapsed business day. Saturdays and Sundays are
/// skipped. Same-day and inverted ranges yield 0; the result is never
/// negative.
pub fn elapsed_business_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let mut day = start.date_naive();
    let last = end.date_naive();
    if last < day {
        return 0;
    }

    let mut counted = 0i64;
    while day <= last {
        if is_business_day(day) {
            counted += 1;
        }
        day += Duration::days(1);
    }

    (counted - 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test_case(2024, 6, 10, true ; "monday")]
    #[test_case(2024, 6, 14, true ; "friday")]
    #[test_case(2024, 6, 15, false ; "saturday")]
    #[test_case(2024, 6, 16, false ; "sunday")]
    fn weekday_classification(y: i32, m: u32, d: u32, expected: bool) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(is_business_day(date), expected);
    }

    #[test]
    fn same_day_is_zero() {
        let d = at(2024, 6, 10, 9);
        assert_eq!(elapsed_business_days(d, d), 0);
    }

    #[test]
    fn inverted_range_is_zero() {
        assert_eq!(
            elapsed_business_days(at(2024, 6, 12, 9), at(2024, 6, 10, 9)),
            0
        );
    }

    #[test]
    fn monday_to_tuesday_is_one() {
        // 2024-06-10 is a Monday
        assert_eq!(
            elapsed_business_days(at(2024, 6, 10, 9), at(2024, 6, 11, 9)),
            1
        );
    }

    #[test]
    fn weekend_days_do_not_count() {
        // Friday 2024-06-14 to Monday 2024-06-17: only one business day elapses
        assert_eq!(
            elapsed_business_days(at(2024, 6, 14, 9), at(2024, 6, 17, 9)),
            1
        );
    }

    #[test]
    fn saturday_to_sunday_is_zero() {
        assert_eq!(
            elapsed_business_days(at(2024, 6, 15, 9), at(2024, 6, 16, 9)),
            0
        );
    }

    #[test]
    fn full_week_spans_five_business_days() {
        // Monday to the following Monday
        assert_eq!(
            elapsed_business_days(at(2024, 6, 10, 9), at(2024, 6, 17, 9)),
            5
        );
    }

    #[test]
    fn time_of_day_is_ignored() {
        assert_eq!(
            elapsed_business_days(at(2024, 6, 10, 23), at(2024, 6, 11, 0)),
            1
        );
    }
}
