//! Month and week arithmetic on naive calendar dates.
//!
//! These are the building blocks for [`crate::period`] and [`crate::active`].
//! All functions are total over chrono's representable range; no system
//! clock is read anywhere.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::types::WeekStartDay;

/// Shift `date` by `month_delta` whole months, then step back `trailing_days_back` days.
///
/// The day of month is clamped to the last valid day of the target month, so
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year) and never rolls into
/// March. Passing `trailing_days_back = 1` turns an exclusive month boundary
/// into an inclusive window end.
///
/// Shifts past chrono's range saturate at [`NaiveDate::MIN`] / [`NaiveDate::MAX`]
/// without stepping back.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use window_engine::calendar::add_months;
///
/// let jan31 = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
/// assert_eq!(add_months(jan31, 1, 0), NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
/// assert_eq!(add_months(jan31, 1, 1), NaiveDate::from_ymd_opt(2020, 2, 28).unwrap());
/// ```
pub fn add_months(date: NaiveDate, month_delta: i32, trailing_days_back: i64) -> NaiveDate {
    let months = Months::new(month_delta.unsigned_abs());
    let shifted = if month_delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    match shifted {
        Some(shifted) => shift_days(shifted, -trailing_days_back),
        None if month_delta >= 0 => NaiveDate::MAX,
        None => NaiveDate::MIN,
    }
}

/// Month counts beyond `i32::MAX` saturate; they overflow any real window anyway.
pub(crate) fn month_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Move `date` by `days` (negative goes back), saturating at
/// [`NaiveDate::MIN`] / [`NaiveDate::MAX`] instead of overflowing.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    checked_shift_days(date, days).unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Move `date` by `days`, or `None` if the result leaves chrono's range.
pub fn checked_shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// How many days `date` is past the start of its week.
fn days_into_week(date: NaiveDate, week_start: WeekStartDay) -> i64 {
    let weekday = date.weekday().num_days_from_monday() as i64;
    (weekday - week_start.index() as i64).rem_euclid(7)
}

/// First day of the week containing `date`.
///
/// Returns `date` itself when it already falls on `week_start`.
pub fn week_start(date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
    shift_days(date, -days_into_week(date, week_start))
}

/// Inclusive end of an `n`-week block that begins with the week containing `start`.
pub fn last_date_after_n_weeks(start: NaiveDate, n: u32, week_start_day: WeekStartDay) -> NaiveDate {
    shift_days(week_start(start, week_start_day), 7 * n as i64 - 1)
}

/// Inclusive start of an `n`-week block that ends with the week containing `end`.
pub fn first_date_before_n_weeks(end: NaiveDate, n: u32, week_start_day: WeekStartDay) -> NaiveDate {
    shift_days(week_start(end, week_start_day), -7 * (n as i64 - 1))
}
