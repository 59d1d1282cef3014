//! One-line status reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Ok,
    Warn,
    Err,
    Neutral,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusLevel::Ok => "ok",
            StatusLevel::Warn => "warn",
            StatusLevel::Err => "err",
            StatusLevel::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Receiver of status lines (a status bar, a terminal, a test log)
pub trait StatusSink: Send + Sync {
    fn set_status(&self, level: StatusLevel, message: &str);
}

/// Sink that keeps every line it receives
#[derive(Debug, Default)]
pub struct StatusLog {
    lines: Mutex<Vec<(StatusLevel, String)>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(StatusLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<(StatusLevel, String)> {
        self.lines().pop()
    }
}

impl StatusSink for StatusLog {
    fn set_status(&self, level: StatusLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}
