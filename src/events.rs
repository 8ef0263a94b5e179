//! Lifecycle logging for testgen.
//!
//! Each run appends plain-text lines to `testcase_generation.log` in the
//! output root. The file is append-only and shared by every run, so the
//! `run` detail on each line ties it to its artifact directory.
//!
//! # Line Format
//!
//! ```text
//! 2024-05-01T09:30:12.345Z INFO task_completed {"output_file":"requirements_analysis.md","task":"analyze_requirements"}
//! ```
//!
//! Fields are separated by single spaces:
//! - RFC3339 UTC timestamp
//! - level (`INFO` or `ERROR`)
//! - action name
//! - details as compact JSON (omitted when empty)

use crate::error::{Result, TestgenError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the lifecycle log inside the output root.
pub const LOG_FILE_NAME: &str = "testcase_generation.log";

/// Severity of a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Lifecycle actions recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Pipeline starting, before the input is read
    RunStarted,
    /// Requirements document flattened to text
    DocumentLoaded,
    /// Agents and tasks constructed
    CrewAssembled,
    /// A task's prompt was sent to the model
    TaskStarted,
    /// A task's output was written to its file
    TaskCompleted,
    /// Word and JSON exports written
    ArtifactsExported,
    /// Pipeline finished successfully
    RunCompleted,
    /// Pipeline aborted with an error
    RunFailed,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::RunStarted => write!(f, "run_started"),
            EventAction::DocumentLoaded => write!(f, "document_loaded"),
            EventAction::CrewAssembled => write!(f, "crew_assembled"),
            EventAction::TaskStarted => write!(f, "task_started"),
            EventAction::TaskCompleted => write!(f, "task_completed"),
            EventAction::ArtifactsExported => write!(f, "artifacts_exported"),
            EventAction::RunCompleted => write!(f, "run_completed"),
            EventAction::RunFailed => write!(f, "run_failed"),
        }
    }
}

/// A single lifecycle log entry.
#[derive(Debug, Clone)]
pub struct Event {
    /// When the event occurred.
    pub ts: DateTime<Utc>,

    /// Severity.
    pub level: Level,

    /// What happened.
    pub action: EventAction,

    /// Freeform details object.
    pub details: Value,
}

impl Event {
    /// Create an `INFO` event stamped with the current time.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            level: Level::Info,
            action,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Create an `ERROR` event stamped with the current time.
    pub fn error(action: EventAction) -> Self {
        Self {
            level: Level::Error,
            ..Self::new(action)
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Render the event as one log line, without the trailing newline.
    pub fn to_log_line(&self) -> String {
        let ts = self.ts.to_rfc3339_opts(SecondsFormat::Millis, true);
        let has_details = match &self.details {
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        };

        if has_details {
            format!("{} {} {} {}", ts, self.level, self.action, self.details)
        } else {
            format!("{} {} {}", ts, self.level, self.action)
        }
    }
}

/// Handle to the append-only lifecycle log file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Log file inside the given output root.
    pub fn in_dir<P: AsRef<Path>>(output_root: P) -> Self {
        Self {
            path: output_root.as_ref().join(LOG_FILE_NAME),
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single line.
    ///
    /// The file and its parent directory are created on first use.
    pub fn append(&self, event: &Event) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            crate::fs::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                TestgenError::Io(format!(
                    "failed to open log file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", event.to_log_line()).map_err(|e| {
            TestgenError::Io(format!(
                "failed to write to log file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}
