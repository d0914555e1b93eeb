//! Error types for the Tether process engine.

use thiserror::Error;

use crate::signal::Signal;

/// Errors surfaced synchronously by engine operations.
///
/// Failures that can only be discovered after a process has been spawned
/// (missing executable, abnormal exit, cancellation) are never returned from
/// an engine call; they appear as a `Failed` transition on the current
/// [`crate::ProcessRecord`] and as an error line on the output stream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine has been shut down")]
    Disposed,

    #[error("No process is currently running")]
    ProcessNotRunning,

    #[error("No active terminal-emulated process")]
    NoActiveTerminal,

    #[error("Signal not supported: {0}")]
    NotSupported(Signal),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, EngineError>;
