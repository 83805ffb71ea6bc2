//! Locate the recurring period that brackets a reference date.
//!
//! Periods are laid end to end starting at the schedule's anchor: each period
//! starts the day after the previous one ended, so they partition the
//! timeline with no gaps or overlaps. [`find_period_window`] walks that
//! sequence forward until it reaches the period whose end is on or after the
//! reference date.
//!
//! Period shapes per [`PeriodKind`]:
//!
//! - `Months`: `[start, add_months(start, n, 1)]`
//! - `Weeks`: `[start, last_date_after_n_weeks(start, n)]`. Only the first
//!   period can be ragged (when the anchor is mid-week); every later one is
//!   exactly `7n` days and starts on the week-start day.
//! - `Days`: `[start, start + n]`, i.e. `n + 1` calendar days per period.

use chrono::NaiveDate;

use crate::calendar::{add_months, last_date_after_n_weeks, month_count, shift_days};
use crate::types::{PeriodKind, Span, WeekStartDay, Window};

/// Inclusive end of the period of shape `span` starting at `start`.
fn period_end(start: NaiveDate, span: Span, week_start: WeekStartDay) -> NaiveDate {
    match span.kind {
        PeriodKind::Months => add_months(start, month_count(span.size), 1),
        PeriodKind::Weeks => last_date_after_n_weeks(start, span.size, week_start),
        PeriodKind::Days => shift_days(start, span.size as i64),
    }
}

/// Length in days of every period after the first, when that length is fixed.
fn steady_period_days(span: Span) -> Option<i64> {
    let days = match span.kind {
        PeriodKind::Days => span.size as i64 + 1,
        PeriodKind::Weeks => 7 * span.size as i64,
        PeriodKind::Months => return None,
    };
    (days > 0).then_some(days)
}

/// The period immediately following `window`.
pub fn next_period_window(window: &Window, span: Span, week_start: WeekStartDay) -> Window {
    let start = shift_days(window.end, 1);
    Window::new(start, period_end(start, span, week_start))
}

/// Find the period window containing `reference`, counting periods of shape
/// `span` forward from `anchor`.
///
/// # Preconditions
///
/// `reference` must not precede `anchor`. If it does, the first period is
/// returned unchanged even though it does not contain `reference`. `span.size`
/// must be at least 1; a zero-sized span cannot advance and the walk stops on
/// the first period that fails to move forward.
///
/// Dates saturate at [`NaiveDate::MAX`], so an oversized `span` yields a
/// period ending there rather than a panic; the walk also stops once the
/// periods can no longer advance.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use window_engine::period::find_period_window;
/// use window_engine::{Span, WeekStartDay};
///
/// let anchor = NaiveDate::from_ymd_opt(2019, 12, 3).unwrap();
/// let today = NaiveDate::from_ymd_opt(2020, 10, 14).unwrap();
/// let window = find_period_window(anchor, Span::weeks(6), today, WeekStartDay::Monday);
/// assert_eq!(window.start, NaiveDate::from_ymd_opt(2020, 9, 21).unwrap());
/// assert_eq!(window.end, NaiveDate::from_ymd_opt(2020, 11, 1).unwrap());
/// ```
pub fn find_period_window(
    anchor: NaiveDate,
    span: Span,
    reference: NaiveDate,
    week_start: WeekStartDay,
) -> Window {
    let mut window = Window::new(anchor, period_end(anchor, span, week_start));

    while reference > window.end {
        let next = next_period_window(&window, span, week_start);
        if next.end <= window.end {
            break;
        }
        window = next;

        // From the second period on, Days and Weeks periods have a fixed
        // length, so whole periods can be skipped in one step.
        if let Some(len) = steady_period_days(span) {
            let behind = (reference - window.start).num_days();
            if behind >= len {
                let skip = behind / len * len;
                window = Window::new(shift_days(window.start, skip), shift_days(window.end, skip));
            }
        }
    }

    window
}
