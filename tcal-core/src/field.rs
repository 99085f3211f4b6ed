//! Calendar-field arithmetic on floating timestamps.
//!
//! All functions take timestamps by value and return the adjusted value.
//! `NaiveDateTime` is `Copy`, so the caller's original always survives.
//! Weeks start on Monday.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Timelike};

/// A named calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    /// Week of year.
    Week,
    /// Day of year (or day of month, they step identically).
    Day,
    Hour,
    Minute,
    Second,
}

/// Last whole second of a day.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("23:59:59 is a valid time"),
};

/// Gregorian leap year rule: divisible by 4, not by 100 unless by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a month (1-based month). Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Normalizes `ts` down to the start of the given field.
///
/// `Year` is January 1st 00:00:00, `Month` the first of the month, `Day`
/// midnight, `Week` the preceding Monday at midnight (a Monday stays put).
pub fn start_of(ts: NaiveDateTime, field: Field) -> NaiveDateTime {
    let date = ts.date();
    match field {
        Field::Year => (date - Duration::days(i64::from(date.ordinal0()))).and_time(NaiveTime::MIN),
        Field::Month => (date - Duration::days(i64::from(date.day0()))).and_time(NaiveTime::MIN),
        Field::Day => date.and_time(NaiveTime::MIN),
        Field::Week => {
            let back = date.weekday().num_days_from_monday();
            (date - Duration::days(i64::from(back))).and_time(NaiveTime::MIN)
        }
        Field::Hour => {
            let into_hour = ts.minute() * 60 + ts.second();
            (ts - Duration::seconds(i64::from(into_hour))).trunc_subsecs(0)
        }
        Field::Minute => (ts - Duration::seconds(i64::from(ts.second()))).trunc_subsecs(0),
        Field::Second => ts.trunc_subsecs(0),
    }
}

/// Normalizes `ts` up to the last second of the given field.
///
/// `Year` is December 31st 23:59:59, `Month` the last day of the month,
/// `Day` 23:59:59, `Week` the following Sunday at 23:59:59.
pub fn end_of(ts: NaiveDateTime, field: Field) -> NaiveDateTime {
    let date = ts.date();
    match field {
        Field::Year => {
            let remaining = days_in_year(date.year()) - date.ordinal();
            (date + Duration::days(i64::from(remaining))).and_time(END_OF_DAY)
        }
        Field::Month => last_day_of_month(date).and_time(END_OF_DAY),
        Field::Day => date.and_time(END_OF_DAY),
        Field::Week => {
            let forward = 6 - date.weekday().num_days_from_monday();
            (date + Duration::days(i64::from(forward))).and_time(END_OF_DAY)
        }
        Field::Hour => {
            let left = (59 - ts.minute()) * 60 + (59 - ts.second());
            (ts + Duration::seconds(i64::from(left))).trunc_subsecs(0)
        }
        Field::Minute => (ts + Duration::seconds(i64::from(59 - ts.second()))).trunc_subsecs(0),
        Field::Second => ts.trunc_subsecs(0),
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let remaining = days_in_month(date.year(), date.month()) - date.day();
    date + Duration::days(i64::from(remaining))
}

/// Adds a signed number of field units to `ts`.
///
/// Month and year steps clamp the day of month to the target month's length
/// (January 31st plus one month is the last day of February). Results that
/// would leave chrono's range saturate at `NaiveDateTime::MIN`/`MAX`.
pub fn add_field(ts: NaiveDateTime, field: Field, amount: i64) -> NaiveDateTime {
    let saturated = if amount < 0 {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    };

    let shifted = match field {
        Field::Year => add_months(ts, amount.checked_mul(12)),
        Field::Month => add_months(ts, Some(amount)),
        Field::Week => amount
            .checked_mul(7)
            .and_then(Duration::try_days)
            .and_then(|d| ts.checked_add_signed(d)),
        Field::Day => Duration::try_days(amount).and_then(|d| ts.checked_add_signed(d)),
        Field::Hour => Duration::try_hours(amount).and_then(|d| ts.checked_add_signed(d)),
        Field::Minute => Duration::try_minutes(amount).and_then(|d| ts.checked_add_signed(d)),
        Field::Second => Duration::try_seconds(amount).and_then(|d| ts.checked_add_signed(d)),
    };

    shifted.unwrap_or(saturated)
}

fn add_months(ts: NaiveDateTime, months: Option<i64>) -> Option<NaiveDateTime> {
    let months = months?;
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months < 0 {
        ts.checked_sub_months(magnitude)
    } else {
        ts.checked_add_months(magnitude)
    }
}

/// Signed distance from `from` to `to` in units of `field`.
///
/// Only the calendar positions are compared: two timestamps on the same day
/// are 0 days apart regardless of their times. Week distances are whole
/// days divided by seven, truncated toward zero, so -8 days is -1 week.
/// Fields finer than a day have no distance and yield 0.
pub fn field_difference(field: Field, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let from_year = i64::from(from.year());
    let to_year = i64::from(to.year());

    match field {
        Field::Year => to_year - from_year,
        Field::Month => {
            (to_year - from_year) * 12 + i64::from(to.month0()) - i64::from(from.month0())
        }
        Field::Day if from_year == to_year => i64::from(to.ordinal()) - i64::from(from.ordinal()),
        Field::Day => day_count(to.date()) - day_count(from.date()),
        Field::Week => (day_count(to.date()) - day_count(from.date())) / 7,
        Field::Hour | Field::Minute | Field::Second => 0,
    }
}

/// Days since the start of year 1 on the proleptic Gregorian calendar.
fn day_count(date: NaiveDate) -> i64 {
    let elapsed_years = i64::from(date.year()) - 1;
    i64::from(date.ordinal()) + elapsed_years * 365 + elapsed_years / 4 - elapsed_years / 100
        + elapsed_years / 400
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn start_of_cascades_from_year_to_day() {
        let ts = at(2011, 1, 13, 15, 14, 9);
        assert_eq!(start_of(ts, Field::Year), at(2011, 1, 1, 0, 0, 0));
        assert_eq!(start_of(ts, Field::Month), at(2011, 1, 1, 0, 0, 0));
        assert_eq!(start_of(ts, Field::Day), at(2011, 1, 13, 0, 0, 0));
        assert_eq!(start_of(ts, Field::Hour), at(2011, 1, 13, 15, 0, 0));
        assert_eq!(start_of(ts, Field::Minute), at(2011, 1, 13, 15, 14, 0));
    }

    #[test]
    fn start_of_week_rolls_back_to_monday() {
        // 2011-03-30 is a Wednesday
        assert_eq!(start_of(at(2011, 3, 30, 13, 0, 0), Field::Week), at(2011, 3, 28, 0, 0, 0));
        // Sunday rolls back six days
        assert_eq!(start_of(at(2011, 4, 3, 9, 0, 0), Field::Week), at(2011, 3, 28, 0, 0, 0));
        // Monday stays
        assert_eq!(start_of(at(2011, 3, 28, 9, 0, 0), Field::Week), at(2011, 3, 28, 0, 0, 0));
    }

    #[test]
    fn end_of_uses_actual_month_length() {
        assert_eq!(end_of(at(2011, 2, 10, 8, 0, 0), Field::Month), at(2011, 2, 28, 23, 59, 59));
        assert_eq!(end_of(at(2012, 2, 10, 8, 0, 0), Field::Month), at(2012, 2, 29, 23, 59, 59));
        assert_eq!(end_of(at(2011, 4, 1, 0, 0, 0), Field::Month), at(2011, 4, 30, 23, 59, 59));
        assert_eq!(end_of(at(2011, 6, 15, 8, 0, 0), Field::Year), at(2011, 12, 31, 23, 59, 59));
        assert_eq!(end_of(at(2011, 6, 15, 8, 0, 0), Field::Day), at(2011, 6, 15, 23, 59, 59));
        assert_eq!(end_of(at(2011, 6, 15, 8, 10, 0), Field::Hour), at(2011, 6, 15, 8, 59, 59));
    }

    #[test]
    fn end_of_week_rolls_forward_to_sunday() {
        assert_eq!(end_of(at(2011, 3, 28, 9, 0, 0), Field::Week), at(2011, 4, 3, 23, 59, 59));
        assert_eq!(end_of(at(2011, 3, 30, 9, 0, 0), Field::Week), at(2011, 4, 3, 23, 59, 59));
        assert_eq!(end_of(at(2011, 4, 3, 9, 0, 0), Field::Week), at(2011, 4, 3, 23, 59, 59));
    }

    #[test]
    fn month_bounds_enclose_every_timestamp() {
        let samples = [
            at(2011, 1, 1, 0, 0, 0),
            at(2011, 2, 28, 23, 59, 59),
            at(2012, 2, 29, 12, 0, 0),
            at(2000, 12, 31, 23, 59, 59),
            at(1999, 7, 15, 6, 30, 0),
        ];
        for t in samples {
            assert!(start_of(t, Field::Month) <= t, "start_of after {t}");
            assert!(t <= end_of(t, Field::Month), "end_of before {t}");
        }
    }

    #[test]
    fn add_field_clamps_month_ends() {
        assert_eq!(add_field(at(2011, 1, 31, 10, 0, 0), Field::Month, 1), at(2011, 2, 28, 10, 0, 0));
        assert_eq!(add_field(at(2012, 2, 29, 10, 0, 0), Field::Year, 1), at(2013, 2, 28, 10, 0, 0));
        assert_eq!(add_field(at(2011, 3, 30, 13, 0, 0), Field::Day, 3), at(2011, 4, 2, 13, 0, 0));
        assert_eq!(add_field(at(2011, 3, 30, 13, 0, 0), Field::Week, -1), at(2011, 3, 23, 13, 0, 0));
        assert_eq!(add_field(at(2011, 3, 30, 13, 0, 0), Field::Month, -3), at(2010, 12, 30, 13, 0, 0));
    }

    #[test]
    fn year_difference_is_antisymmetric() {
        let a = at(2011, 3, 30, 13, 0, 0);
        let b = at(1987, 11, 2, 0, 0, 0);
        assert_eq!(field_difference(Field::Year, a, b), -24);
        assert_eq!(field_difference(Field::Year, a, b), -field_difference(Field::Year, b, a));
    }

    #[test]
    fn month_difference_spans_years() {
        let from = at(2010, 11, 5, 0, 0, 0);
        let to = at(2011, 2, 1, 0, 0, 0);
        assert_eq!(field_difference(Field::Month, from, to), 3);
        assert_eq!(field_difference(Field::Month, to, from), -3);
    }

    #[test]
    fn day_difference_counts_leap_days() {
        let from = at(2011, 3, 30, 13, 0, 0);
        assert_eq!(field_difference(Field::Day, from, at(2011, 3, 1, 0, 0, 0)), -29);
        assert_eq!(field_difference(Field::Day, at(2011, 12, 31, 0, 0, 0), at(2012, 3, 1, 0, 0, 0)), 61);
        assert_eq!(field_difference(Field::Day, at(2099, 12, 31, 0, 0, 0), at(2100, 3, 1, 0, 0, 0)), 60);
        assert_eq!(field_difference(Field::Day, at(1999, 12, 31, 0, 0, 0), at(2000, 3, 1, 0, 0, 0)), 61);
    }

    #[test]
    fn week_difference_truncates_toward_zero() {
        let from = at(2011, 1, 5, 0, 0, 0);
        assert_eq!(field_difference(Field::Week, from, at(2011, 1, 14, 0, 0, 0)), 1);
        // -8 days is -1 week, not -2 as floor division would give
        assert_eq!(field_difference(Field::Week, from, at(2010, 12, 28, 0, 0, 0)), -1);
        assert_eq!(field_difference(Field::Week, from, at(2010, 12, 30, 0, 0, 0)), 0);
    }

    #[test]
    fn sub_day_fields_have_no_difference() {
        let a = at(2011, 1, 5, 0, 0, 0);
        let b = at(2011, 1, 5, 12, 30, 0);
        assert_eq!(field_difference(Field::Hour, a, b), 0);
        assert_eq!(field_difference(Field::Second, a, b), 0);
    }

    #[test]
    fn days_in_month_follows_gregorian_rule() {
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2011, 9), 30);
        assert_eq!(days_in_month(2011, 13), 0);
    }
}
