//! `active-window`: inspect recurring schedule windows and run jobs inside them.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use window_engine::{
    ActiveSpec, CancellationToken, Clock, Dispatcher, PollInterval, Schedule, ScheduleConfig,
    Span, SystemClock, WeekStartDay, Window,
};

/// Compute the calendar windows of a recurring schedule
#[derive(Parser, Debug)]
#[command(name = "active-window", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the period window containing a date and its active part
    Window {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Reference date (defaults to today's local date)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Poll the schedule and print a line on every tick inside the active window
    Watch {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Time between ticks, e.g. 30s, 5m, 1h (overrides the config file)
        #[arg(long)]
        poll: Option<PollInterval>,

        /// Stop after this many runs
        #[arg(long)]
        max_runs: Option<u64>,

        /// Pretend every tick happens on this date
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Where the schedule comes from: a JSON config file or individual flags.
#[derive(Args, Debug)]
struct ScheduleArgs {
    /// JSON schedule configuration file
    #[arg(long, conflicts_with_all = ["anchor", "every", "active", "week_start"])]
    config: Option<PathBuf>,

    /// Date periods are counted from (YYYY-MM-DD)
    #[arg(long)]
    anchor: Option<NaiveDate>,

    /// Recurring period, e.g. 6w, 10d, 3m
    #[arg(long)]
    every: Option<Span>,

    /// Active part of each period, e.g. "first 3d", "last 2w"
    #[arg(long)]
    active: Option<ActiveSpec>,

    /// First day of the week: 0-6 (0 = Monday) or a weekday name
    #[arg(long)]
    week_start: Option<WeekStartDay>,
}

impl ScheduleArgs {
    fn resolve(&self) -> Result<(Schedule, Option<PollInterval>)> {
        if let Some(path) = &self.config {
            let config = ScheduleConfig::from_path(path)
                .with_context(|| format!("reading schedule config {}", path.display()))?;
            let schedule = config.to_schedule().context("invalid schedule config")?;
            let poll = config
                .poll
                .is_some()
                .then(|| config.poll_interval())
                .transpose()
                .context("invalid poll interval in config")?;
            return Ok((schedule, poll));
        }

        let mut builder = Schedule::builder().week_start(self.week_start.unwrap_or_default());
        if let Some(anchor) = self.anchor {
            builder = builder.anchor(anchor);
        }
        if let Some(every) = self.every {
            builder = builder.every(every);
        }
        if let Some(active) = self.active {
            builder = builder.active(active);
        }
        let schedule = builder
            .build()
            .context("pass --config or --anchor, --every and --active")?;
        Ok((schedule, None))
    }
}

#[derive(Serialize)]
struct WindowReport {
    schedule: String,
    today: NaiveDate,
    period: Window,
    active: Window,
    is_active: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Window {
            schedule,
            today,
            json,
        } => {
            let (schedule, _) = schedule.resolve()?;
            let today = today.unwrap_or_else(|| SystemClock.today());
            print_windows(&schedule, today, json)
        }
        Command::Watch {
            schedule,
            poll,
            max_runs,
            today,
        } => {
            let (schedule, config_poll) = schedule.resolve()?;
            let poll = poll.or(config_poll).unwrap_or_default();
            watch(schedule, poll, max_runs, today).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("window_engine=info,active_window=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn warn_if_before_anchor(schedule: &Schedule, today: NaiveDate) {
    if today < schedule.anchor() {
        warn!(
            %today,
            anchor = %schedule.anchor(),
            "reference date precedes the anchor; the period window will not contain it"
        );
    }
}

fn print_windows(schedule: &Schedule, today: NaiveDate, json: bool) -> Result<()> {
    warn_if_before_anchor(schedule, today);
    let windows = schedule
        .windows(today)
        .context("active window does not fit the period")?;
    let report = WindowReport {
        schedule: schedule.to_string(),
        today,
        period: windows.period,
        active: windows.active,
        is_active: windows.active.contains(today),
    };

    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "schedule: {}", report.schedule)?;
        writeln!(out, "today:    {}", report.today)?;
        writeln!(out, "period:   {}", report.period)?;
        writeln!(out, "active:   {}", report.active)?;
        writeln!(
            out,
            "status:   {}",
            if report.is_active { "active" } else { "inactive" }
        )?;
    }
    Ok(())
}

async fn watch(
    schedule: Schedule,
    poll: PollInterval,
    max_runs: Option<u64>,
    today: Option<NaiveDate>,
) -> Result<()> {
    if let Some(today) = today {
        warn_if_before_anchor(&schedule, today);
    }
    let clock = move || today.unwrap_or_else(|| SystemClock.today());
    let dispatcher = Dispatcher::new(schedule, poll).with_clock(clock);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            on_signal.cancel();
        }
    });

    let stopper = cancel.clone();
    let mut runs = 0u64;
    let report = dispatcher
        .run(
            |activation| {
                runs += 1;
                println!("run {runs}: {} in {}", activation.today, activation.window);
                if max_runs.is_some_and(|max| runs >= max) {
                    stopper.cancel();
                }
            },
            cancel,
        )
        .await
        .context("dispatcher stopped")?;

    info!(ticks = report.ticks, runs = report.runs, "watch finished");
    Ok(())
}
