//! Stdin pipe lifecycle for interactive launches.
//!
//! A channel is allocated per process start and handed to the caller-facing
//! side of the engine before the child exists; the pipe itself is attached
//! once the spawn succeeds. Teardown drops the pipe, which the child observes
//! as end-of-file on its stdin.

use std::sync::Arc;
use tether_proto::{EngineError, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::sync::Mutex;
use tracing::debug;

/// Write side of the current process's stdin.
///
/// Cheap to clone; all clones share the one underlying pipe.
#[derive(Clone, Default)]
pub struct InputChannel {
    stdin: Arc<Mutex<Option<ChildStdin>>>,
}

impl InputChannel {
    /// Creates an unattached channel. Writes fail until [`Self::attach`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the freshly spawned child's stdin to this channel.
    pub async fn attach(&self, stdin: ChildStdin) {
        let mut guard = self.stdin.lock().await;
        *guard = Some(stdin);
    }

    /// Writes and flushes `bytes` to the child's stdin.
    ///
    /// Fails with [`EngineError::ProcessNotRunning`] when no pipe is
    /// attached, which covers both "never spawned" and "already torn down".
    pub async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or(EngineError::ProcessNotRunning)?;
        stdin.write_all(bytes).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Returns true while a pipe is attached.
    pub async fn is_open(&self) -> bool {
        self.stdin.lock().await.is_some()
    }

    /// Drops the pipe; the child sees EOF on stdin. Idempotent.
    pub async fn close(&self) {
        let mut guard = self.stdin.lock().await;
        if guard.take().is_some() {
            debug!("Input channel closed");
        }
    }
}
