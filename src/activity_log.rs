//! Rolling, level-tagged activity log.
//!
//! The console keeps the most recent entries in memory so they can be shown
//! to the operator, and mirrors every entry into the `log` facade under
//! `library_versioning::activity::<tag>` so the formatter can print the tag.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use strum_macros::{AsRefStr, Display};

use crate::config::{ACTIVITY_LOG_CAPACITY, ACTIVITY_LOG_TARGET};

/// Level tag of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ActivityLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ActivityLevel {
    /// Record level used when the entry is mirrored into the `log` facade.
    pub fn log_level(self) -> log::Level {
        match self {
            ActivityLevel::Info | ActivityLevel::Success => log::Level::Info,
            ActivityLevel::Warning => log::Level::Warn,
            ActivityLevel::Error => log::Level::Error,
        }
    }

    pub fn log_target(self) -> &'static str {
        match self {
            ActivityLevel::Info => "library_versioning::activity::info",
            ActivityLevel::Success => "library_versioning::activity::success",
            ActivityLevel::Warning => "library_versioning::activity::warning",
            ActivityLevel::Error => "library_versioning::activity::error",
        }
    }

    /// Inverse of [`ActivityLevel::log_target`]; `None` for ordinary records.
    pub fn from_log_target(target: &str) -> Option<Self> {
        match target.strip_prefix(ACTIVITY_LOG_TARGET)?.strip_prefix("::")? {
            "info" => Some(ActivityLevel::Info),
            "success" => Some(ActivityLevel::Success),
            "warning" => Some(ActivityLevel::Warning),
            "error" => Some(ActivityLevel::Error),
            _ => None,
        }
    }
}

/// One line of the activity log.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Local>,
    pub level: ActivityLevel,
    pub message: String,
}

impl std::fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// Append-only log that keeps at most `capacity` entries, dropping the oldest.
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, level: ActivityLevel, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: level.log_target(), level.log_level(), "{message}");

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back(ActivityEntry {
            timestamp: Local::now(),
            level,
            message,
        });
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ActivityLevel::Error, message);
    }

    /// Copy of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(ACTIVITY_LOG_CAPACITY)
    }
}
