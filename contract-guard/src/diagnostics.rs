//! Diagnostics collection for configuration parsing and result reduction.
//!
//! Instead of reporting through a shared logging singleton, every parsing and
//! reduction entry point takes an explicit [`Logs`] collector. Callers merge
//! collectors and decide afterwards whether the accumulated errors abort the
//! run. This keeps the "collect all configuration errors in one pass"
//! requirement directly assertable in tests. Entries are mirrored to the
//! `tracing` subscriber as they are recorded.

use serde::Serialize;
use std::fmt;

/// Severity of a diagnostics entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// A source location inside a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// File the configuration tree was read from.
    pub file_path: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Location {
    /// Creates a location.
    pub fn new(file_path: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.column)
    }
}

/// A single collected diagnostics entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} | {}", self.message, location),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Ordered collector of diagnostics produced while parsing a contract,
/// compiling its checks or reducing engine results.
#[derive(Debug, Default)]
pub struct Logs {
    entries: Vec<LogEntry>,
}

impl Logs {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error without a source location.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into(), None);
    }

    /// Records an error with an optional source location.
    pub fn error_at(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.push(LogLevel::Error, message.into(), location);
    }

    /// Records a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message.into(), None);
    }

    /// Records a warning with an optional source location.
    pub fn warning_at(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.push(LogLevel::Warning, message.into(), location);
    }

    /// Records an informational note.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into(), None);
    }

    /// Records a debug note.
    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Debug, message.into(), None);
    }

    fn push(&mut self, level: LogLevel, message: String, location: Option<Location>) {
        match level {
            LogLevel::Error => tracing::error!(location = ?location, "{message}"),
            LogLevel::Warning => tracing::warn!(location = ?location, "{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
        }
        self.entries.push(LogEntry {
            level,
            message,
            location,
        });
    }

    /// Returns all collected entries in recording order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns true if at least one error was collected.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    /// Returns the messages of all collected errors.
    pub fn error_messages(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Appends all entries of another collector.
    pub fn merge(&mut self, other: Logs) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for Logs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
