//! # tether-proto
//!
//! Shared types and error definitions for the Tether process engine.
//!
//! This crate provides the vocabulary the engine and its consumers share,
//! including:
//! - Process records and the state-transition function that drives them
//! - Output line events published on the live stream
//! - Emulated terminal signals and launch modes
//! - The common error type

mod error;
mod line;
mod record;
mod signal;

pub use error::{EngineError, Result};
pub use line::OutputLine;
pub use record::{ProcessRecord, ProcessState, RunEvent};
pub use signal::{LaunchMode, Signal};
