//! Schedule configuration files.
//!
//! A schedule can be described in JSON:
//!
//! ```json
//! {
//!   "anchor": "2019-12-03",
//!   "week_start": "monday",
//!   "every": "6w",
//!   "active": "last 2w",
//!   "poll": "30s"
//! }
//! ```
//!
//! `week_start` takes a 0-6 index or a weekday name and defaults to Monday.
//! `poll` is optional and only used by the dispatcher.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::active::ActiveSpec;
use crate::dispatch::PollInterval;
use crate::error::Result;
use crate::schedule::Schedule;
use crate::types::{Span, WeekStartDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub anchor: NaiveDate,
    #[serde(default)]
    pub week_start: WeekStartDay,
    pub every: String,
    pub active: String,
    #[serde(default)]
    pub poll: Option<String>,
}

impl ScheduleConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded schedule configuration");
        Ok(config)
    }

    /// Parse the span strings and build a validated [`Schedule`].
    pub fn to_schedule(&self) -> Result<Schedule> {
        let every: Span = self.every.parse()?;
        let active: ActiveSpec = self.active.parse()?;
        let schedule = Schedule::builder()
            .anchor(self.anchor)
            .week_start(self.week_start)
            .every(every)
            .active(active)
            .build()?;
        info!(week_start = %self.week_start, anchor = %self.anchor, "schedule configured");
        Ok(schedule)
    }

    /// The configured poll interval, or the default of one second.
    pub fn poll_interval(&self) -> Result<PollInterval> {
        match &self.poll {
            Some(poll) => poll.parse(),
            None => Ok(PollInterval::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::last;
    use crate::error::WindowError;
    use std::io::Write;

    const SIX_WEEKS: &str = r#"{
        "anchor": "2019-12-03",
        "week_start": "Mon",
        "every": "6w",
        "active": "last 2w",
        "poll": "5m"
    }"#;

    #[test]
    fn test_parse_full_config() {
        let config = ScheduleConfig::from_json_str(SIX_WEEKS).unwrap();
        let schedule = config.to_schedule().unwrap();
        assert_eq!(schedule.every(), Span::weeks(6));
        assert_eq!(schedule.active(), last(Span::weeks(2)));
        assert_eq!(schedule.week_start(), WeekStartDay::Monday);
        assert_eq!(config.poll_interval().unwrap(), PollInterval::minutes(5));
    }

    #[test]
    fn test_defaults_for_week_start_and_poll() {
        let config = ScheduleConfig::from_json_str(
            r#"{"anchor": "2020-01-01", "every": "1m", "active": "first 3d"}"#,
        )
        .unwrap();
        assert_eq!(config.week_start, WeekStartDay::Monday);
        assert_eq!(config.poll_interval().unwrap(), PollInterval::seconds(1));
    }

    #[test]
    fn test_week_start_as_index() {
        let config = ScheduleConfig::from_json_str(
            r#"{"anchor": "2020-01-01", "week_start": 6, "every": "1w", "active": "first 1d"}"#,
        )
        .unwrap();
        assert_eq!(config.week_start, WeekStartDay::Sunday);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ScheduleConfig::from_json_str(
            r#"{"anchor": "2020-01-01", "every": "1w", "active": "first 1d", "start_day": 2}"#,
        );
        assert!(matches!(result, Err(WindowError::Json(_))));
    }

    #[test]
    fn test_bad_span_surfaces_on_build() {
        let config = ScheduleConfig::from_json_str(
            r#"{"anchor": "2020-01-01", "every": "1 fortnight", "active": "first 1d"}"#,
        )
        .unwrap();
        assert!(matches!(config.to_schedule(), Err(WindowError::InvalidSpan(_))));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SIX_WEEKS.as_bytes()).unwrap();
        let config = ScheduleConfig::from_path(file.path()).unwrap();
        assert_eq!(config.anchor, NaiveDate::from_ymd_opt(2019, 12, 3).unwrap());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ScheduleConfig::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(WindowError::Io(_))));
    }
}
