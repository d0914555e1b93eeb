//! Process records and the transitions that drive them.
//!
//! A [`ProcessRecord`] describes one invocation attempt of an external
//! command. Records never mutate in place: the listener task folds
//! [`RunEvent`]s over the current record with [`ProcessRecord::apply`] and
//! swaps the result in, so every transition is a pure function that can be
//! tested without spawning anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle state of one process invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Start accepted but the record has not yet been published as running.
    NotStarted,
    /// The invocation is live (possibly still spawning in the background).
    Running,
    /// The child exited with status zero.
    Completed,
    /// Non-zero exit, spawn failure, pump error, or forced stop.
    Failed,
}

impl ProcessState {
    /// Returns true for `Completed` and `Failed`, the states a record can
    /// never leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Completed | ProcessState::Failed)
    }

    /// Returns the state as a stable lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::NotStarted => "not_started",
            ProcessState::Running => "running",
            ProcessState::Completed => "completed",
            ProcessState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle event folded into a [`ProcessRecord`] by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// The start operation accepted this record as current.
    Started,
    /// The child spawned; carries the real operating-system pid.
    Launched { pid: u32 },
    /// The child exited on its own with a status code.
    Exited { exit_code: i32 },
    /// Spawn or event-pump failure; no usable exit status exists.
    Faulted,
    /// A stop ran out of patience and force-finished the record.
    Killed,
}

/// One invocation attempt of an external command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Operating-system process id; `0` until the child has actually spawned.
    pub pid: u32,
    pub state: ProcessState,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub exit_code: Option<i32>,
}

impl ProcessRecord {
    /// Creates a fresh `NotStarted` record for the given invocation.
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            pid: 0,
            state: ProcessState::NotStarted,
            command: command.into(),
            args,
            working_dir,
            started_at: Utc::now(),
            finished_at: None,
            exit_code: None,
        }
    }

    /// Folds one event into this record, returning the successor record.
    ///
    /// Terminal records are immutable: applying any further event returns the
    /// record unchanged. This is what makes racing transitions safe; when a
    /// forced stop loses the race against a natural exit, its `Killed` event
    /// lands on an already-terminal record and becomes a no-op instead of
    /// overwriting the real exit code.
    pub fn apply(&self, event: &RunEvent, at: DateTime<Utc>) -> Self {
        if self.state.is_terminal() {
            return self.clone();
        }

        let mut next = self.clone();
        match event {
            RunEvent::Started => {
                next.state = ProcessState::Running;
            }
            RunEvent::Launched { pid } => {
                next.pid = *pid;
                next.state = ProcessState::Running;
            }
            RunEvent::Exited { exit_code } => {
                next.state = if *exit_code == 0 {
                    ProcessState::Completed
                } else {
                    ProcessState::Failed
                };
                next.exit_code = Some(*exit_code);
                next.finished_at = Some(at);
            }
            RunEvent::Faulted | RunEvent::Killed => {
                next.state = ProcessState::Failed;
                next.exit_code = Some(-1);
                next.finished_at = Some(at);
            }
        }
        next
    }

    /// Returns true while the invocation is live.
    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    /// Returns true once the record has reached `Completed` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
