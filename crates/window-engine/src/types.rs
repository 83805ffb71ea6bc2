//! Value types shared by the window engine.
//!
//! Everything here is `Copy` and carries no behaviour beyond parsing and
//! display: the arithmetic lives in [`crate::calendar`], [`crate::period`]
//! and [`crate::active`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;

// ── Week start ──────────────────────────────────────────────────────────────

/// Which weekday begins a week for week-based window arithmetic.
///
/// Indexed ISO-style: Monday is 0, Sunday is 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WeekStartRepr", into = "u8")]
pub enum WeekStartDay {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

const WEEKDAY_NAMES: [(&str, &str); 7] = [
    ("mon", "monday"),
    ("tue", "tuesday"),
    ("wed", "wednesday"),
    ("thu", "thursday"),
    ("fri", "friday"),
    ("sat", "saturday"),
    ("sun", "sunday"),
];

impl WeekStartDay {
    const ALL: [WeekStartDay; 7] = [
        WeekStartDay::Monday,
        WeekStartDay::Tuesday,
        WeekStartDay::Wednesday,
        WeekStartDay::Thursday,
        WeekStartDay::Friday,
        WeekStartDay::Saturday,
        WeekStartDay::Sunday,
    ];

    /// The 0-6 index of this day (0 = Monday).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a day by its 0-6 index. Returns `None` for anything above 6.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Full lowercase English name, e.g. `"tuesday"`.
    pub fn name(self) -> &'static str {
        WEEKDAY_NAMES[self as usize].1
    }
}

impl From<Weekday> for WeekStartDay {
    fn from(day: Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl From<WeekStartDay> for Weekday {
    fn from(day: WeekStartDay) -> Self {
        match day {
            WeekStartDay::Monday => Weekday::Mon,
            WeekStartDay::Tuesday => Weekday::Tue,
            WeekStartDay::Wednesday => Weekday::Wed,
            WeekStartDay::Thursday => Weekday::Thu,
            WeekStartDay::Friday => Weekday::Fri,
            WeekStartDay::Saturday => Weekday::Sat,
            WeekStartDay::Sunday => Weekday::Sun,
        }
    }
}

impl From<WeekStartDay> for u8 {
    fn from(day: WeekStartDay) -> Self {
        day.index()
    }
}

impl fmt::Display for WeekStartDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index(), capitalize(self.name()))
    }
}

/// Parse a week start from an index (`"1"`), an abbreviation (`"tue"`) or a
/// full name (`"Tuesday"`). Case-insensitive.
impl FromStr for WeekStartDay {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Ok(index) = s.parse::<u8>() {
            return Self::from_index(index)
                .ok_or_else(|| WindowError::InvalidWeekStart(format!("index {index} is not 0-6")));
        }
        WEEKDAY_NAMES
            .iter()
            .position(|(short, long)| s == *short || s == *long)
            .map(|i| Self::ALL[i])
            .ok_or_else(|| WindowError::InvalidWeekStart(format!("'{s}'")))
    }
}

/// Accept either `1` or `"tuesday"` in configuration files.
#[derive(Deserialize)]
#[serde(untagged)]
enum WeekStartRepr {
    Index(u8),
    Name(String),
}

impl TryFrom<WeekStartRepr> for WeekStartDay {
    type Error = WindowError;

    fn try_from(repr: WeekStartRepr) -> Result<Self, Self::Error> {
        match repr {
            WeekStartRepr::Index(i) => Self::from_index(i)
                .ok_or_else(|| WindowError::InvalidWeekStart(format!("index {i} is not 0-6"))),
            WeekStartRepr::Name(name) => name.parse(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Spans ───────────────────────────────────────────────────────────────────

/// Unit in which a recurring period or an active sub-window is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Days,
    Weeks,
    Months,
}

impl PeriodKind {
    fn unit_name(self, plural: bool) -> &'static str {
        match (self, plural) {
            (PeriodKind::Days, false) => "day",
            (PeriodKind::Days, true) => "days",
            (PeriodKind::Weeks, false) => "week",
            (PeriodKind::Weeks, true) => "weeks",
            (PeriodKind::Months, false) => "month",
            (PeriodKind::Months, true) => "months",
        }
    }
}

/// Which edge of the period window the active sub-window hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    First,
    Last,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Selector::First => "first",
            Selector::Last => "last",
        })
    }
}

/// A length of calendar time: `size` units of `kind`.
///
/// `size` is expected to be at least 1. The window functions do not check
/// this; [`crate::schedule::ScheduleBuilder`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub kind: PeriodKind,
    pub size: u32,
}

impl Span {
    pub const fn days(size: u32) -> Self {
        Self {
            kind: PeriodKind::Days,
            size,
        }
    }

    pub const fn weeks(size: u32) -> Self {
        Self {
            kind: PeriodKind::Weeks,
            size,
        }
    }

    pub const fn months(size: u32) -> Self {
        Self {
            kind: PeriodKind::Months,
            size,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.size, self.kind.unit_name(self.size != 1))
    }
}

/// Parse `"6w"`, `"10d"`, `"3m"`, or the long forms `"6 weeks"`, `"1 month"`.
impl FromStr for Span {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| WindowError::InvalidSpan(format!("missing unit in '{s}'")))?;
        if digits_end == 0 {
            return Err(WindowError::InvalidSpan(format!(
                "expected a number at the start of '{s}'"
            )));
        }
        let size: u32 = trimmed[..digits_end]
            .parse()
            .map_err(|_| WindowError::InvalidSpan(format!("invalid number in '{s}'")))?;
        let kind = match trimmed[digits_end..].trim() {
            "d" | "day" | "days" => PeriodKind::Days,
            "w" | "week" | "weeks" => PeriodKind::Weeks,
            "m" | "month" | "months" => PeriodKind::Months,
            unit => {
                return Err(WindowError::InvalidSpan(format!(
                    "unknown unit '{unit}' in '{s}'"
                )))
            }
        };
        Ok(Self { kind, size })
    }
}

// ── Window ──────────────────────────────────────────────────────────────────

/// An inclusive date range. `start <= end` for every window the engine returns
/// from valid inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the window, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` lies entirely inside this window.
    pub fn encloses(&self, other: &Window) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
