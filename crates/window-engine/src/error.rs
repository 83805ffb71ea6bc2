//! Error types for window-engine operations.

use thiserror::Error;

use crate::types::Window;

#[derive(Error, Debug)]
pub enum WindowError {
    /// The active sub-window spills outside the period window that should contain it.
    #[error("Active date range overflow: active window {active} is not inside period window {window}")]
    OutOfRange { active: Window, window: Window },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    #[error("Invalid week start day: {0}")]
    InvalidWeekStart(String),

    #[error("Invalid poll interval: {0}")]
    InvalidInterval(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WindowError>;
