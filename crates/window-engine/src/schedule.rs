//! Immutable schedule values and their builder.
//!
//! A [`Schedule`] bundles everything the window functions need: the anchor
//! date periods are counted from, the week-start convention, the recurring
//! period and the active sub-window. Each schedule owns its own settings;
//! there is no process-wide default anchor or week start.
//!
//! ```
//! use chrono::NaiveDate;
//! use window_engine::active::last;
//! use window_engine::{Schedule, Span, WeekStartDay};
//!
//! let schedule = Schedule::builder()
//!     .anchor(NaiveDate::from_ymd_opt(2019, 12, 3).unwrap())
//!     .week_start(WeekStartDay::Monday)
//!     .every(Span::weeks(6))
//!     .active(last(Span::weeks(2)))
//!     .build()
//!     .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2020, 10, 14).unwrap();
//! assert!(!schedule.is_active(today).unwrap());
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::active::{select_active_window, ActiveSpec};
use crate::error::{Result, WindowError};
use crate::period::find_period_window;
use crate::types::{Span, WeekStartDay, Window};

/// A validated recurring schedule: "the `active` part of every `every`,
/// counted from `anchor`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schedule {
    anchor: NaiveDate,
    week_start: WeekStartDay,
    every: Span,
    active: ActiveSpec,
}

/// The period window bracketing a date together with its active part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleWindows {
    pub period: Window,
    pub active: Window,
}

impl Schedule {
    pub fn builder() -> ScheduleBuilder {
        ScheduleBuilder::default()
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn week_start(&self) -> WeekStartDay {
        self.week_start
    }

    pub fn every(&self) -> Span {
        self.every
    }

    pub fn active(&self) -> ActiveSpec {
        self.active
    }

    /// The period window containing `today`.
    ///
    /// `today` must not precede the anchor; see [`find_period_window`].
    pub fn period_window(&self, today: NaiveDate) -> Window {
        find_period_window(self.anchor, self.every, today, self.week_start)
    }

    /// The active sub-window of the period containing `today`.
    pub fn active_window(&self, today: NaiveDate) -> Result<Window> {
        Ok(self.windows(today)?.active)
    }

    /// Both the period window containing `today` and its active part.
    pub fn windows(&self, today: NaiveDate) -> Result<ScheduleWindows> {
        let period = self.period_window(today);
        let active = select_active_window(self.active, self.week_start, &period)?;
        Ok(ScheduleWindows { period, active })
    }

    /// Whether a job on this schedule may run on `today`.
    pub fn is_active(&self, today: NaiveDate) -> Result<bool> {
        Ok(self.active_window(today)?.contains(today))
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of every {} from {} (weeks start {})",
            self.active,
            self.every,
            self.anchor,
            self.week_start.name()
        )
    }
}

/// Builder for [`Schedule`]. Each setter consumes and returns the builder, so
/// the order of calls does not matter.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    anchor: Option<NaiveDate>,
    week_start: WeekStartDay,
    every: Option<Span>,
    active: Option<ActiveSpec>,
}

impl ScheduleBuilder {
    pub fn anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn week_start(mut self, week_start: WeekStartDay) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn every(mut self, every: Span) -> Self {
        self.every = Some(every);
        self
    }

    pub fn active(mut self, active: ActiveSpec) -> Self {
        self.active = Some(active);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// [`WindowError::InvalidConfig`] if the anchor, period or active spec is
    /// missing, or if either span has a size of zero.
    pub fn build(self) -> Result<Schedule> {
        let anchor = self
            .anchor
            .ok_or_else(|| WindowError::InvalidConfig("missing anchor date".to_string()))?;
        let every = self
            .every
            .ok_or_else(|| WindowError::InvalidConfig("missing recurring period".to_string()))?;
        let active = self
            .active
            .ok_or_else(|| WindowError::InvalidConfig("missing active window".to_string()))?;

        if every.size == 0 {
            return Err(WindowError::InvalidConfig(
                "recurring period size must be at least 1".to_string(),
            ));
        }
        if active.span.size == 0 {
            return Err(WindowError::InvalidConfig(
                "active window size must be at least 1".to_string(),
            ));
        }

        Ok(Schedule {
            anchor,
            week_start: self.week_start,
            every,
            active,
        })
    }
}
