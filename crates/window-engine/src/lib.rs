//! # window-engine
//!
//! Calendar-window computation for recurring job schedules.
//!
//! A schedule such as "the last 2 weeks of every 6 weeks, counted from
//! 2019-12-03" is evaluated in two steps: find the period window that
//! brackets today, then carve the active sub-window out of it. A job is
//! eligible to run only while today lies in that active window.
//!
//! All dates are naive calendar dates; there is no timezone handling and no
//! sub-day arithmetic outside the dispatcher's poll interval.
//!
//! ## Modules
//!
//! - [`calendar`] — Month shifting with day clamping, week-start alignment, n-week blocks
//! - [`period`] — Walk fixed-size periods forward from an anchor to the one containing a date
//! - [`active`] — Select the first/last N days, weeks or months of a period window
//! - [`schedule`] — Immutable schedule values and their builder
//! - [`config`] — JSON schedule configuration
//! - [`dispatch`] — Cancellable polling loop that runs a job inside the active window
//! - [`types`] — Shared value types
//! - [`error`] — Error types

pub mod active;
pub mod calendar;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod period;
pub mod schedule;
pub mod types;

pub use active::{first, last, select_active_window, ActiveSpec};
pub use calendar::{
    add_months, checked_shift_days, first_date_before_n_weeks, last_date_after_n_weeks,
    shift_days, week_start,
};
pub use config::ScheduleConfig;
pub use dispatch::{
    Activation, Clock, DispatchReport, Dispatcher, FixedClock, PollInterval, SystemClock, TimeUnit,
};
pub use error::{Result, WindowError};
pub use period::{find_period_window, next_period_window};
pub use schedule::{Schedule, ScheduleBuilder, ScheduleWindows};
pub use types::{PeriodKind, Selector, Span, WeekStartDay, Window};

/// Re-exported so callers can cancel a [`Dispatcher`] without depending on
/// `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
