//! Carve the active sub-window out of a period window.
//!
//! A job is eligible to run only during the first or last N days, weeks or
//! months of each period. The result must lie inside the period window; if
//! the requested span does not fit (e.g. "last 5 weeks" of a 2-week period)
//! the configuration is rejected with [`WindowError::OutOfRange`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{
    add_months, checked_shift_days, first_date_before_n_weeks, last_date_after_n_weeks,
    month_count, shift_days,
};
use crate::error::{Result, WindowError};
use crate::types::{PeriodKind, Selector, Span, WeekStartDay, Window};

/// Which part of each period is active: `first 3 days`, `last 2 weeks`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSpec {
    pub selector: Selector,
    pub span: Span,
}

/// The first `span` of each period.
pub const fn first(span: Span) -> ActiveSpec {
    ActiveSpec {
        selector: Selector::First,
        span,
    }
}

/// The last `span` of each period.
pub const fn last(span: Span) -> ActiveSpec {
    ActiveSpec {
        selector: Selector::Last,
        span,
    }
}

impl fmt::Display for ActiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.selector, self.span)
    }
}

/// Parse `"first 3d"`, `"last 2 weeks"`, ...
impl std::str::FromStr for ActiveSpec {
    type Err = WindowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (selector, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) if word.eq_ignore_ascii_case("first") => (Selector::First, rest),
            Some((word, rest)) if word.eq_ignore_ascii_case("last") => (Selector::Last, rest),
            _ => {
                return Err(WindowError::InvalidSpan(format!(
                    "expected 'first <span>' or 'last <span>', got '{trimmed}'"
                )))
            }
        };
        Ok(ActiveSpec {
            selector,
            span: rest.parse()?,
        })
    }
}

/// Select the active sub-window of `window` described by `active`.
///
/// The edge named by the selector is kept as is (`window.start` for
/// [`Selector::First`], `window.end` for [`Selector::Last`]); the other edge
/// is computed:
///
/// | kind   | first: end                                   | last: start                                 |
/// |--------|----------------------------------------------|---------------------------------------------|
/// | Days   | `start + (n - 1)`                            | `end - (n - 1)`                             |
/// | Weeks  | `last_date_after_n_weeks(start, n)`          | `first_date_before_n_weeks(end, n)`         |
/// | Months | `add_months(start, n, 1)`                    | `add_months(end + 1, -n, 0)`                |
///
/// # Errors
///
/// Returns [`WindowError::OutOfRange`] when the computed sub-window is not
/// enclosed by `window` or ends before it starts (a zero-sized span). This
/// check runs for every kind and selector. A day count reaching past chrono's
/// date range is out of range as well; week and month bounds saturate at
/// [`NaiveDate::MIN`] / [`NaiveDate::MAX`] before the check.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use window_engine::active::{last, select_active_window};
/// use window_engine::{Span, WeekStartDay, Window};
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
/// let period = Window::new(d(2020, 9, 21), d(2020, 11, 1));
/// let active = select_active_window(last(Span::weeks(2)), WeekStartDay::Monday, &period).unwrap();
/// assert_eq!(active, Window::new(d(2020, 10, 19), d(2020, 11, 1)));
/// ```
pub fn select_active_window(
    active: ActiveSpec,
    week_start: WeekStartDay,
    window: &Window,
) -> Result<Window> {
    let n = active.span.size;
    let out_of_range = |selected: Window| WindowError::OutOfRange {
        active: selected,
        window: *window,
    };
    let mut selected = *window;

    match (active.span.kind, active.selector) {
        (PeriodKind::Days, Selector::First) => {
            selected.end = checked_shift_days(window.start, n as i64 - 1)
                .ok_or_else(|| out_of_range(Window::new(window.start, NaiveDate::MAX)))?;
        }
        (PeriodKind::Days, Selector::Last) => {
            selected.start = checked_shift_days(window.end, 1 - n as i64)
                .ok_or_else(|| out_of_range(Window::new(NaiveDate::MIN, window.end)))?;
        }
        (PeriodKind::Weeks, Selector::First) => {
            selected.end = last_date_after_n_weeks(window.start, n, week_start);
        }
        (PeriodKind::Weeks, Selector::Last) => {
            selected.start = first_date_before_n_weeks(window.end, n, week_start);
        }
        (PeriodKind::Months, Selector::First) => {
            selected.end = add_months(window.start, month_count(n), 1);
        }
        (PeriodKind::Months, Selector::Last) => {
            selected.start = add_months(shift_days(window.end, 1), -month_count(n), 0);
        }
    }

    if selected.start > selected.end || !window.encloses(&selected) {
        return Err(out_of_range(selected));
    }
    Ok(selected)
}
