//! Cancellable polling loop that runs a job while its schedule is active.
//!
//! On every tick the [`Dispatcher`] asks its [`Clock`] for today's date,
//! re-derives the active window from the [`Schedule`], runs the job if today
//! falls inside it, and then waits for the poll interval or for cancellation,
//! whichever comes first. Window computation is cheap enough to repeat on
//! every tick, so the loop holds no cached window and follows the calendar
//! across period boundaries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, WindowError};
use crate::schedule::Schedule;
use crate::types::Window;

// ── Poll interval ───────────────────────────────────────────────────────────

/// Unit of a [`PollInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }

    fn suffix(self) -> char {
        match self {
            TimeUnit::Seconds => 's',
            TimeUnit::Minutes => 'm',
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
        }
    }
}

/// How long the dispatcher sleeps between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollInterval {
    pub count: u64,
    pub unit: TimeUnit,
}

impl PollInterval {
    pub const fn new(count: u64, unit: TimeUnit) -> Self {
        Self { count, unit }
    }

    pub const fn seconds(count: u64) -> Self {
        Self::new(count, TimeUnit::Seconds)
    }

    pub const fn minutes(count: u64) -> Self {
        Self::new(count, TimeUnit::Minutes)
    }

    pub const fn hours(count: u64) -> Self {
        Self::new(count, TimeUnit::Hours)
    }

    pub const fn days(count: u64) -> Self {
        Self::new(count, TimeUnit::Days)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.count.saturating_mul(self.unit.seconds()))
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::seconds(1)
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

/// Parse `"30s"`, `"5m"`, `"1h"`, `"1d"` or long forms such as `"5 minutes"`.
impl FromStr for PollInterval {
    type Err = WindowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| WindowError::InvalidInterval(format!("missing unit in '{s}'")))?;
        let count: u64 = trimmed[..split]
            .parse()
            .map_err(|_| WindowError::InvalidInterval(format!("expected a number in '{s}'")))?;
        if count == 0 {
            return Err(WindowError::InvalidInterval(format!(
                "interval must be at least 1 in '{s}'"
            )));
        }
        let unit = match trimmed[split..].trim() {
            "s" | "sec" | "second" | "seconds" => TimeUnit::Seconds,
            "m" | "min" | "minute" | "minutes" => TimeUnit::Minutes,
            "h" | "hour" | "hours" => TimeUnit::Hours,
            "d" | "day" | "days" => TimeUnit::Days,
            unit => {
                return Err(WindowError::InvalidInterval(format!(
                    "unknown unit '{unit}' in '{s}'"
                )))
            }
        };
        Ok(Self { count, unit })
    }
}

// ── Clock ───────────────────────────────────────────────────────────────────

/// Source of "today" for the dispatcher.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send + Sync,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────────────

/// Passed to the job each time it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub today: NaiveDate,
    pub window: Window,
}

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub ticks: u64,
    pub runs: u64,
}

/// Runs a job on every poll tick that falls inside the schedule's active window.
pub struct Dispatcher<C = SystemClock> {
    schedule: Schedule,
    poll: PollInterval,
    clock: C,
}

impl Dispatcher<SystemClock> {
    pub fn new(schedule: Schedule, poll: PollInterval) -> Self {
        Self {
            schedule,
            poll,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Dispatcher<C> {
    /// Replace the clock, e.g. with a [`FixedClock`] in tests.
    pub fn with_clock<D: Clock>(self, clock: D) -> Dispatcher<D> {
        Dispatcher {
            schedule: self.schedule,
            poll: self.poll,
            clock,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn poll(&self) -> PollInterval {
        self.poll
    }

    /// Poll until `cancel` fires, running `job` on every tick whose date lies
    /// in the active window.
    ///
    /// The job runs synchronously on the dispatcher's task; a long job delays
    /// the next tick. Cancelling from inside the job stops the loop before the
    /// next tick.
    ///
    /// # Errors
    ///
    /// Stops and returns [`WindowError::OutOfRange`] as soon as the schedule's
    /// active window does not fit its period.
    pub async fn run<F>(&self, mut job: F, cancel: CancellationToken) -> Result<DispatchReport>
    where
        F: FnMut(&Activation),
    {
        info!(schedule = %self.schedule, poll = %self.poll, "dispatcher starting");
        let mut report = DispatchReport::default();
        let period = self.poll.as_duration();

        while !cancel.is_cancelled() {
            let today = self.clock.today();
            let window = self
                .schedule
                .active_window(today)
                .inspect_err(|err| warn!(%today, %err, "cannot compute active window"))?;
            report.ticks += 1;

            if window.contains(today) {
                debug!(%today, %window, "inside active window, running job");
                job(&Activation { today, window });
                report.runs += 1;
            } else {
                debug!(%today, %window, "outside active window");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }
        }

        info!(ticks = report.ticks, runs = report.runs, "dispatcher stopped");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::{first, last};
    use crate::types::Span;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn six_week_schedule() -> Schedule {
        Schedule::builder()
            .anchor(d(2019, 12, 3))
            .every(Span::weeks(6))
            .active(last(Span::weeks(2)))
            .build()
            .unwrap()
    }

    // ── PollInterval ────────────────────────────────────────────────────

    #[test]
    fn test_poll_interval_parses_units() {
        assert_eq!("30s".parse::<PollInterval>().unwrap(), PollInterval::seconds(30));
        assert_eq!("5 minutes".parse::<PollInterval>().unwrap(), PollInterval::minutes(5));
        assert_eq!("1H".parse::<PollInterval>().unwrap(), PollInterval::hours(1));
        assert_eq!("2d".parse::<PollInterval>().unwrap(), PollInterval::days(2));
    }

    #[test]
    fn test_poll_interval_rejects_bad_input() {
        assert!("0s".parse::<PollInterval>().is_err());
        assert!("s".parse::<PollInterval>().is_err());
        assert!("10".parse::<PollInterval>().is_err());
        assert!("10 fortnights".parse::<PollInterval>().is_err());
    }

    #[test]
    fn test_poll_interval_duration() {
        assert_eq!(PollInterval::minutes(2).as_duration(), Duration::from_secs(120));
        assert_eq!(PollInterval::days(1).as_duration(), Duration::from_secs(86_400));
        assert_eq!(PollInterval::hours(3).to_string(), "3h");
    }

    // ── Dispatcher ──────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_runs_job_while_active_until_cancelled() {
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        let dispatcher = Dispatcher::new(six_week_schedule(), PollInterval::minutes(1))
            .with_clock(FixedClock(d(2020, 10, 20)));

        let mut seen = Vec::new();
        let report = dispatcher
            .run(
                |activation| {
                    seen.push(*activation);
                    if seen.len() == 3 {
                        stopper.cancel();
                    }
                },
                cancel,
            )
            .await
            .unwrap();

        assert_eq!(report, DispatchReport { ticks: 3, runs: 3 });
        assert_eq!(seen[0].window, Window::new(d(2020, 10, 19), d(2020, 11, 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_job_outside_active_window() {
        let cancel = CancellationToken::new();
        let dispatcher = Dispatcher::new(six_week_schedule(), PollInterval::seconds(10))
            .with_clock(FixedClock(d(2020, 10, 14)));

        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(35)).await;
            stopper.cancel();
        });

        let mut runs = 0;
        let report = dispatcher.run(|_| runs += 1, cancel).await.unwrap();

        assert_eq!(runs, 0);
        assert_eq!(report.runs, 0);
        assert_eq!(report.ticks, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_clock_into_active_window() {
        // One day per tick starting 2020-10-16; the active window opens on the 19th
        let calls = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&calls);
        let clock = move || d(2020, 10, 16) + chrono::Duration::days(counter.fetch_add(1, Ordering::SeqCst));

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        let dispatcher = Dispatcher::new(six_week_schedule(), PollInterval::days(1)).with_clock(clock);

        let mut first_run = None;
        let report = dispatcher
            .run(
                |activation| {
                    first_run = Some(activation.today);
                    stopper.cancel();
                },
                cancel,
            )
            .await
            .unwrap();

        assert_eq!(first_run, Some(d(2020, 10, 19)));
        assert_eq!(report, DispatchReport { ticks: 4, runs: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_stops_loop() {
        let schedule = Schedule::builder()
            .anchor(d(2020, 1, 1))
            .every(Span::days(5))
            .active(first(Span::days(10)))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(schedule, PollInterval::seconds(1))
            .with_clock(FixedClock(d(2020, 1, 3)));

        let result = dispatcher.run(|_| {}, CancellationToken::new()).await;
        assert!(matches!(result, Err(WindowError::OutOfRange { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_never_ticks() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let dispatcher = Dispatcher::new(six_week_schedule(), PollInterval::seconds(1))
            .with_clock(FixedClock(d(2020, 10, 20)));
        let report = dispatcher.run(|_| {}, cancel).await.unwrap();
        assert_eq!(report, DispatchReport::default());
    }
}
