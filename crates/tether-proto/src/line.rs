//! Output line events published on the live stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded line of process output.
///
/// Text is carried verbatim; terminal escape sequences are never stripped.
/// Lines exist only in flight on the broadcast stream, there is no history
/// buffer to fetch them from afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub text: String,
    /// True for stdout, false for stderr (and engine diagnostics).
    pub is_stdout: bool,
    /// Capture time; non-decreasing across the lines of a single process.
    pub timestamp: DateTime<Utc>,
}

impl OutputLine {
    /// Creates a line captured from the child's stdout.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_stdout: true,
            timestamp: Utc::now(),
        }
    }

    /// Creates a line captured from the child's stderr.
    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_stdout: false,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for OutputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_constructor() {
        let line = OutputLine::stdout("hello");
        assert_eq!(line.text, "hello");
        assert!(line.is_stdout);
    }

    #[test]
    fn test_stderr_constructor() {
        let line = OutputLine::stderr("oops");
        assert_eq!(line.text, "oops");
        assert!(!line.is_stdout);
    }

    #[test]
    fn test_escape_sequences_survive() {
        let line = OutputLine::stdout("\x1b[31mred\x1b[0m");
        assert_eq!(line.text, "\x1b[31mred\x1b[0m");
    }

    #[test]
    fn test_display_is_bare_text() {
        let line = OutputLine::stderr("warning: thing");
        assert_eq!(line.to_string(), "warning: thing");
    }
}
