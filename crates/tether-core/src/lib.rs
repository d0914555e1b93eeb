//! # tether-core
//!
//! Process supervision and output streaming engine.
//!
//! The engine launches one external command at a time, multicasts its decoded
//! stdout/stderr lines to any number of live subscribers, forwards
//! interactive input, and emulates terminal signals and resize over plain
//! pipes. No real pseudo-terminal is ever allocated.
//!
//! Entry point is [`ProcessSupervisor`]:
//!
//! ```no_run
//! use tether_core::ProcessSupervisor;
//!
//! # async fn demo() -> tether_core::Result<()> {
//! let engine = ProcessSupervisor::default();
//!
//! let mut stream = engine.subscribe();
//! tokio::spawn(async move {
//!     while let Some(line) = stream.recv().await {
//!         println!("{line}");
//!     }
//! });
//!
//! let record = engine
//!     .execute_and_wait("echo", vec!["hello".to_string()], None)
//!     .await?;
//! assert_eq!(record.exit_code, Some(0));
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod broadcast;
mod config;
mod input;
mod probe;
mod supervisor;

pub use broadcast::{OutputBroadcaster, OutputStream};
pub use config::{EngineConfig, TermSize};
pub use input::InputChannel;
pub use probe::is_command_available;
pub use supervisor::ProcessSupervisor;

// Re-export the shared vocabulary so the engine is a one-import surface.
pub use tether_proto::{
    EngineError, LaunchMode, OutputLine, ProcessRecord, ProcessState, Result, RunEvent, Signal,
};
