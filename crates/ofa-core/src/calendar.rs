//! Calendar keys derived from the purchase timestamp.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Absolute month number (`year * 12 + month0`), so differences between two
/// values are whole months.
pub fn month_number(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Whole months from `cohort` to `order`, both taken at month granularity.
pub fn months_between(cohort: NaiveDate, order: NaiveDate) -> i64 {
    month_number(order) - month_number(cohort)
}

/// Date, week and month buckets of one purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseKeys {
    pub date: NaiveDate,
    pub week: NaiveDate,
    pub month: NaiveDate,
}

impl PurchaseKeys {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        let date = ts.date();
        Self {
            date,
            week: week_start(date),
            month: month_start(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2017-10-04 is a Wednesday.
        assert_eq!(week_start(d(2017, 10, 4)), d(2017, 10, 2));
        assert_eq!(week_start(d(2017, 10, 2)), d(2017, 10, 2));
        // Sunday belongs to the week that began six days earlier.
        assert_eq!(week_start(d(2017, 10, 8)), d(2017, 10, 2));
        // Crosses a year boundary.
        assert_eq!(week_start(d(2018, 1, 3)), d(2018, 1, 1));
        assert_eq!(week_start(d(2017, 1, 1)), d(2016, 12, 26));
    }

    #[test]
    fn month_start_truncates() {
        assert_eq!(month_start(d(2018, 2, 28)), d(2018, 2, 1));
        assert_eq!(month_start(d(2018, 3, 1)), d(2018, 3, 1));
    }

    #[test]
    fn months_between_spans_years() {
        assert_eq!(months_between(d(2017, 11, 1), d(2018, 2, 1)), 3);
        assert_eq!(months_between(d(2018, 1, 1), d(2018, 1, 1)), 0);
    }

    #[test]
    fn keys_from_timestamp() {
        let ts = d(2017, 11, 18).and_hms_opt(19, 28, 6).unwrap();
        let keys = PurchaseKeys::from_timestamp(ts);
        assert_eq!(keys.date, d(2017, 11, 18));
        assert_eq!(keys.week, d(2017, 11, 13));
        assert_eq!(keys.month, d(2017, 11, 1));
    }
}
