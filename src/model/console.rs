//! Console log store
//!
//! Ordered, append-only record of diagnostics captured from the sandbox.
//! Entries only leave the log through `clear()` or, when a capacity is set,
//! by evicting the oldest entries first.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Severity of a console diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

impl ConsoleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleLevel::Log => "log",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Error => "error",
        }
    }

    /// Single-character marker used when printing the log
    pub fn marker(&self) -> char {
        match self {
            ConsoleLevel::Log => '›',
            ConsoleLevel::Warn => '⚠',
            ConsoleLevel::Error => '✕',
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of console output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleEntry {
    pub level: ConsoleLevel,
    pub message: String,
    /// Local wall-clock time the entry was accepted (HH:MM:SS)
    pub timestamp: String,
}

impl ConsoleEntry {
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for ConsoleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.timestamp, self.level.marker(), self.message)
    }
}

/// Append-only console log with an optional capacity
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    entries: VecDeque<ConsoleEntry>,
    /// Maximum retained entries (None = unbounded)
    capacity: Option<usize>,
    /// Entries evicted because of the capacity since the last clear
    evicted: usize,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that retains at most `capacity` entries (0 = unbounded)
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: (capacity > 0).then_some(capacity),
            ..Self::default()
        }
    }

    pub fn append(&mut self, entry: ConsoleEntry) {
        self.entries.push_back(entry);
        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
    }

    /// Remove every entry. Calling it on an empty log is a no-op.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.evicted = 0;
    }

    /// Entries in append order
    pub fn list(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConsoleEntry> {
        self.entries.back()
    }

    pub fn evicted(&self) -> usize {
        self.evicted
    }
}
