//! Emulated terminal signals and process launch modes.
//!
//! No real pseudo-terminal is allocated anywhere in the engine. Signals are
//! approximated either by writing the terminal's control byte to the child's
//! stdin pipe (interactive launches) or by cancelling the execution scope
//! (batch launches).

use serde::{Deserialize, Serialize};

/// A control signal the engine can emulate for the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Ctrl-C (SIGINT).
    Interrupt,
    /// Ctrl-\ (SIGQUIT).
    Quit,
    /// Ctrl-Z (SIGTSTP).
    Stop,
    /// Graceful termination request; delegates to a graceful stop.
    Terminate,
    /// Immediate termination; delegates to a forced stop.
    Kill,
    /// Resume a stopped process. Not deliverable over a pipe.
    Continue,
}

impl Signal {
    /// Returns the control byte a terminal would feed to the child for this
    /// signal, or `None` when no single-byte encoding exists.
    pub fn control_byte(self) -> Option<u8> {
        match self {
            Signal::Interrupt => Some(0x03),
            Signal::Quit => Some(0x1c),
            Signal::Stop => Some(0x1a),
            Signal::Terminate | Signal::Kill | Signal::Continue => None,
        }
    }

    /// Returns the caret notation a terminal echoes when the control byte is
    /// typed, e.g. `^C` for interrupt.
    pub fn caret_echo(self) -> Option<&'static str> {
        match self {
            Signal::Interrupt => Some("^C"),
            Signal::Quit => Some("^\\"),
            Signal::Stop => Some("^Z"),
            Signal::Terminate | Signal::Kill | Signal::Continue => None,
        }
    }

    /// Returns the signal name as a stable uppercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Interrupt => "INTERRUPT",
            Signal::Quit => "QUIT",
            Signal::Stop => "STOP",
            Signal::Terminate => "TERMINATE",
            Signal::Kill => "KILL",
            Signal::Continue => "CONTINUE",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a process start wires up the child's stdin and signal handling.
///
/// `Interactive` and `PtyEmulated` overlap deliberately; both pipe stdin and
/// deliver control bytes. The PTY-emulated mode additionally advertises
/// terminal geometry to the child through environment hints, participates in
/// resize, and locally echoes caret notation onto the output stream when a
/// control byte is sent, the way a terminal would.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// No stdin pipe; emulated signals cancel the execution scope.
    #[default]
    Batch,
    /// Stdin pipe open; `Interrupt`/`Quit`/`Stop` become control bytes.
    Interactive,
    /// Interactive plus terminal geometry env hints and caret echo.
    PtyEmulated,
}

impl LaunchMode {
    /// Returns true when the child gets a stdin pipe at spawn.
    pub fn wants_stdin(self) -> bool {
        matches!(self, LaunchMode::Interactive | LaunchMode::PtyEmulated)
    }

    /// Returns true for the terminal-emulating mode.
    pub fn is_pty_emulated(self) -> bool {
        matches!(self, LaunchMode::PtyEmulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_bytes() {
        assert_eq!(Signal::Interrupt.control_byte(), Some(0x03));
        assert_eq!(Signal::Quit.control_byte(), Some(0x1c));
        assert_eq!(Signal::Stop.control_byte(), Some(0x1a));
        assert_eq!(Signal::Terminate.control_byte(), None);
        assert_eq!(Signal::Kill.control_byte(), None);
        assert_eq!(Signal::Continue.control_byte(), None);
    }

    #[test]
    fn test_caret_echo_matches_control_bytes() {
        for signal in [
            Signal::Interrupt,
            Signal::Quit,
            Signal::Stop,
            Signal::Terminate,
            Signal::Kill,
            Signal::Continue,
        ] {
            assert_eq!(
                signal.control_byte().is_some(),
                signal.caret_echo().is_some()
            );
        }
        assert_eq!(Signal::Interrupt.caret_echo(), Some("^C"));
        assert_eq!(Signal::Quit.caret_echo(), Some("^\\"));
    }

    #[test]
    fn test_stdin_wiring_per_mode() {
        assert!(!LaunchMode::Batch.wants_stdin());
        assert!(LaunchMode::Interactive.wants_stdin());
        assert!(LaunchMode::PtyEmulated.wants_stdin());
        assert!(LaunchMode::PtyEmulated.is_pty_emulated());
        assert!(!LaunchMode::Interactive.is_pty_emulated());
    }

    #[test]
    fn test_default_mode_is_batch() {
        assert_eq!(LaunchMode::default(), LaunchMode::Batch);
    }

    #[test]
    fn test_display() {
        assert_eq!(Signal::Interrupt.to_string(), "INTERRUPT");
        assert_eq!(Signal::Continue.to_string(), "CONTINUE");
    }
}
