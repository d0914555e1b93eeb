//! Process supervision: the single-active-process engine.
//!
//! Architecture:
//! - One "current process" slot, replaced atomically under an async mutex
//!   that serializes `start`, `stop`, and `shutdown`
//! - A background listener task per start spawns the child, pumps its
//!   stdout/stderr lines into the output broadcaster, and folds lifecycle
//!   events into the shared record
//! - Stop cancels the execution scope, waits a bounded grace window for the
//!   listener to observe completion, then escalates to a kill
//! - Spawn failures surface as `Failed` records and stream diagnostics,
//!   never as errors from `start`

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tether_proto::{
    EngineError, LaunchMode, OutputLine, ProcessRecord, Result, RunEvent, Signal,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broadcast::{OutputBroadcaster, OutputStream};
use crate::config::{EngineConfig, TermSize};
use crate::input::InputChannel;
use crate::probe;

/// How long the listener keeps draining already-decoded output after the
/// child has exited but its pipes are still open (inherited by grandchildren).
const DRAIN_WINDOW: Duration = Duration::from_millis(200);

/// Prefix on diagnostic lines the engine itself pushes onto the stream.
const DIAG_PREFIX: &str = "[tether]";

/// Handles to the current process, cloned out of the slot so no lock is held
/// across an await.
#[derive(Clone)]
struct Handles {
    record: Arc<RwLock<ProcessRecord>>,
    cancel: CancellationToken,
    input: InputChannel,
    mode: LaunchMode,
    abort: AbortHandle,
}

/// Everything the background listener needs, captured at start time.
struct ListenerContext {
    record: Arc<RwLock<ProcessRecord>>,
    cancel: CancellationToken,
    input: InputChannel,
    broadcaster: Arc<OutputBroadcaster>,
    mode: LaunchMode,
    term: TermSize,
    grace: Duration,
    poll: Duration,
}

/// The single-active-process supervisor.
///
/// Owns the current-process slot, the output broadcaster, and the emulated
/// terminal geometry. All methods take `&self`; the supervisor is designed to
/// live in an `Arc` shared between the presentation layer and its tasks.
pub struct ProcessSupervisor {
    config: EngineConfig,
    broadcaster: Arc<OutputBroadcaster>,
    /// Serializes start/stop/shutdown so two processes can never be
    /// simultaneously current.
    op_lock: tokio::sync::Mutex<()>,
    slot: Mutex<Option<Handles>>,
    term: Mutex<TermSize>,
    disposed: AtomicBool,
}

impl ProcessSupervisor {
    /// Creates a supervisor with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let broadcaster = Arc::new(OutputBroadcaster::new(config.channel_capacity));
        let term = Mutex::new(config.term);
        Self {
            config,
            broadcaster,
            op_lock: tokio::sync::Mutex::new(()),
            slot: Mutex::new(None),
            term,
            disposed: AtomicBool::new(false),
        }
    }

    /// Attaches a subscriber to the live output stream.
    ///
    /// Late subscribers see only lines published after they attach. After
    /// [`Self::shutdown`] the returned stream ends immediately.
    pub fn subscribe(&self) -> OutputStream {
        self.broadcaster.subscribe()
    }

    /// Returns a snapshot of the current process record, `None` before any
    /// start has been accepted.
    pub fn current_record(&self) -> Option<ProcessRecord> {
        self.current().map(|handles| snapshot(&handles.record))
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts a process, replacing (and first stopping) any current one.
    ///
    /// Returns immediately with a `Running` record; the spawn and the event
    /// pump proceed in the background. A spawn failure shows up asynchronously
    /// as a `Failed` record with exit code `-1` plus an error line on the
    /// stream, never as an error from this method.
    pub async fn start(
        &self,
        command: impl Into<String>,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
        mode: LaunchMode,
    ) -> Result<ProcessRecord> {
        let handles = self
            .start_internal(command.into(), args, working_dir, mode)
            .await?;
        Ok(snapshot(&handles.record))
    }

    /// Starts a batch process and waits for it to reach a terminal state.
    ///
    /// Spawn failures and abnormal exits come back as `Failed` records, not
    /// errors; only argument validation and a disposed engine produce `Err`.
    pub async fn execute_and_wait(
        &self,
        command: impl Into<String>,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    ) -> Result<ProcessRecord> {
        self.execute_and_wait_with_cancel(command, args, working_dir, &CancellationToken::new())
            .await
    }

    /// Like [`Self::execute_and_wait`], but the caller's token can abandon
    /// the wait early. On cancellation the process is stopped gracefully and
    /// its terminal record is returned.
    pub async fn execute_and_wait_with_cancel(
        &self,
        command: impl Into<String>,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<ProcessRecord> {
        let handles = self
            .start_internal(command.into(), args, working_dir, LaunchMode::Batch)
            .await?;

        // Poll our own record handle rather than the slot; a concurrent start
        // may replace the slot, but this wait belongs to this run only.
        loop {
            let record = snapshot(&handles.record);
            if record.is_terminal() {
                return Ok(record);
            }
            if cancel.is_cancelled() {
                debug!("Wait cancelled by caller, stopping process");
                self.stop_if_current(&handles).await;
                return Ok(snapshot(&handles.record));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Stops the current process. A no-op when nothing is current.
    ///
    /// Graceful: cancel the execution scope, wait up to the grace window for
    /// the listener to observe completion, then tear down the input channel.
    /// Non-graceful: cancel, tear down, and kill immediately. Either way a
    /// record still `Running` afterwards is force-transitioned to `Failed`
    /// with exit code `-1`.
    pub async fn stop(&self, graceful: bool) -> Result<()> {
        self.ensure_live()?;
        let _guard = self.op_lock.lock().await;
        self.stop_current(graceful, None).await;
        Ok(())
    }

    /// Like [`Self::stop`], but the caller's token can abandon the grace
    /// wait early and move straight to teardown.
    pub async fn stop_with_cancel(&self, graceful: bool, cancel: &CancellationToken) -> Result<()> {
        self.ensure_live()?;
        let _guard = self.op_lock.lock().await;
        self.stop_current(graceful, Some(cancel)).await;
        Ok(())
    }

    /// Writes `text` to the current process's stdin and flushes.
    ///
    /// Requires a `Running` record and an open input channel, so batch-mode
    /// starts always fail here. Write failures are pushed to the stream as
    /// error lines and also returned.
    pub async fn send_input(&self, text: &str) -> Result<()> {
        self.ensure_live()?;
        let Some(handles) = self.current() else {
            return Err(EngineError::ProcessNotRunning);
        };
        if !snapshot(&handles.record).is_running() || !handles.mode.wants_stdin() {
            return Err(EngineError::ProcessNotRunning);
        }

        match handles.input.write(text.as_bytes()).await {
            Ok(()) => Ok(()),
            Err(EngineError::Io(e)) => {
                warn!(error = %e, "Input write failed");
                self.broadcaster.publish(OutputLine::stderr(format!(
                    "{DIAG_PREFIX} input write failed: {e}"
                )));
                Err(EngineError::Io(e))
            }
            Err(other) => Err(other),
        }
    }

    /// Delivers an emulated signal to the current process.
    ///
    /// `Interrupt`/`Quit`/`Stop` become control bytes on the input channel
    /// for interactive-family launches, or a cancellation of the execution
    /// scope for batch launches. `Terminate` and `Kill` delegate to
    /// [`Self::stop`]. `Continue` has no pipe encoding and is rejected.
    pub async fn send_signal(&self, signal: Signal) -> Result<()> {
        self.ensure_live()?;
        if !self.current_record().is_some_and(|r| r.is_running()) {
            return Err(EngineError::ProcessNotRunning);
        }

        match signal {
            Signal::Terminate => self.stop(true).await,
            Signal::Kill => self.stop(false).await,
            Signal::Continue => Err(EngineError::NotSupported(signal)),
            Signal::Interrupt | Signal::Quit | Signal::Stop => self.deliver_control(signal).await,
        }
    }

    /// Updates the emulated terminal size.
    ///
    /// Requires a running PTY-emulated process. The new geometry reaches
    /// processes started from now on through `COLUMNS`/`LINES` environment
    /// hints; the live child is not resized, since no real PTY exists.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.ensure_live()?;
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidArgument(
                "terminal size must be non-zero".to_string(),
            ));
        }

        let has_terminal = self.current().is_some_and(|handles| {
            handles.mode.is_pty_emulated() && snapshot(&handles.record).is_running()
        });
        if !has_terminal {
            return Err(EngineError::NoActiveTerminal);
        }

        if let Ok(mut term) = self.term.lock() {
            *term = TermSize { cols, rows };
        }
        info!(cols, rows, "Terminal size updated");
        self.broadcaster.publish(OutputLine::stderr(format!(
            "{DIAG_PREFIX} terminal resized to {cols}x{rows}; applies to processes started from now on"
        )));
        Ok(())
    }

    /// Returns true if `command` resolves to something runnable.
    ///
    /// Missing commands are a plain `false`; only an empty name or a
    /// disposed engine produce an error.
    pub async fn is_command_available(&self, command: &str) -> Result<bool> {
        self.ensure_live()?;
        if command.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "command must not be empty".to_string(),
            ));
        }
        Ok(probe::is_command_available(command).await)
    }

    /// Tears the engine down: force-stops any current process and closes the
    /// output stream. Idempotent. Every operation afterwards fails with
    /// [`EngineError::Disposed`].
    pub async fn shutdown(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down process engine");
        let _guard = self.op_lock.lock().await;
        self.stop_current(false, None).await;
        self.broadcaster.close();
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            Err(EngineError::Disposed)
        } else {
            Ok(())
        }
    }

    fn current(&self) -> Option<Handles> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }

    fn term_size(&self) -> TermSize {
        self.term.lock().map(|guard| *guard).unwrap_or_default()
    }

    async fn start_internal(
        &self,
        command: String,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
        mode: LaunchMode,
    ) -> Result<Handles> {
        self.ensure_live()?;
        if command.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "command must not be empty".to_string(),
            ));
        }

        let _guard = self.op_lock.lock().await;
        // A shutdown may have won the lock while we were queued.
        self.ensure_live()?;
        self.stop_current(true, None).await;

        let record = ProcessRecord::new(command, args, working_dir)
            .apply(&RunEvent::Started, Utc::now());
        debug!(command = %record.command, mode = ?mode, "Start accepted");

        let record = Arc::new(RwLock::new(record));
        let cancel = CancellationToken::new();
        let input = InputChannel::new();

        let listener = tokio::spawn(run_listener(ListenerContext {
            record: record.clone(),
            cancel: cancel.clone(),
            input: input.clone(),
            broadcaster: self.broadcaster.clone(),
            mode,
            term: self.term_size(),
            grace: self.config.grace_period,
            poll: self.config.poll_interval,
        }));

        let handles = Handles {
            record,
            cancel,
            input,
            mode,
            abort: listener.abort_handle(),
        };
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(handles.clone());
        }
        Ok(handles)
    }

    /// Stops the current process. Callers must hold the op lock.
    async fn stop_current(&self, graceful: bool, caller: Option<&CancellationToken>) {
        let Some(handles) = self.current() else {
            return;
        };
        if snapshot(&handles.record).is_terminal() {
            return;
        }

        debug!(graceful, "Stopping current process");
        handles.cancel.cancel();

        if graceful {
            let deadline = Instant::now() + self.config.grace_period;
            while Instant::now() < deadline && !snapshot(&handles.record).is_terminal() {
                if let Some(token) = caller
                    && token.is_cancelled()
                {
                    debug!("Grace wait abandoned by caller");
                    break;
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        handles.input.close().await;

        let record = snapshot(&handles.record);
        if record.is_running() {
            warn!(pid = record.pid, "Process still running after stop, killing");
            kill_by_pid(record.pid);
            handles.abort.abort();
            apply_event(&handles.record, &RunEvent::Killed);
            info!(pid = record.pid, "Process force-finished");
        }
    }

    /// Stops the run behind `handles` only if it is still the current one.
    async fn stop_if_current(&self, handles: &Handles) {
        let _guard = self.op_lock.lock().await;
        let still_current = self
            .current()
            .is_some_and(|current| Arc::ptr_eq(&current.record, &handles.record));
        if still_current {
            self.stop_current(true, None).await;
        }
    }

    async fn deliver_control(&self, signal: Signal) -> Result<()> {
        let Some(handles) = self.current() else {
            return Err(EngineError::ProcessNotRunning);
        };
        if !snapshot(&handles.record).is_running() {
            return Err(EngineError::ProcessNotRunning);
        }

        if handles.mode.wants_stdin() {
            let Some(byte) = signal.control_byte() else {
                return Err(EngineError::NotSupported(signal));
            };
            handles.input.write(&[byte]).await?;
            if handles.mode.is_pty_emulated()
                && let Some(echo) = signal.caret_echo()
            {
                // Terminal-style local echo of the control character.
                self.broadcaster.publish(OutputLine::stdout(echo));
            }
            debug!(signal = %signal, "Control byte delivered");
        } else {
            debug!(signal = %signal, "No input channel, cancelling execution scope");
            handles.cancel.cancel();
        }
        Ok(())
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        // Children are spawned with kill_on_drop; cancelling here lets the
        // listener wind the child down even without an explicit shutdown.
        if let Ok(slot) = self.slot.lock()
            && let Some(handles) = slot.as_ref()
        {
            handles.cancel.cancel();
        }
    }
}

/// The background listener: spawns the child, pumps output, folds lifecycle
/// events into the record, and cleans up the input channel at the end.
async fn run_listener(ctx: ListenerContext) {
    let (command, args, working_dir) = {
        let record = snapshot(&ctx.record);
        (record.command, record.args, record.working_dir)
    };

    let mut cmd = Command::new(&command);
    cmd.args(&args);
    if let Some(dir) = &working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(if ctx.mode.wants_stdin() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.kill_on_drop(true);
    if ctx.mode.is_pty_emulated() {
        cmd.env("COLUMNS", ctx.term.cols.to_string())
            .env("LINES", ctx.term.rows.to_string())
            .env("TERM", "xterm-256color");
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(command = %command, error = %e, "Spawn failed");
            ctx.broadcaster.publish(OutputLine::stderr(format!(
                "{DIAG_PREFIX} failed to start {command}: {e}"
            )));
            apply_event(&ctx.record, &RunEvent::Faulted);
            return;
        }
    };

    // Attach stdin before publishing the pid, so a record that shows a pid
    // always has a writable input channel behind it.
    if ctx.mode.wants_stdin()
        && let Some(stdin) = child.stdin.take()
    {
        ctx.input.attach(stdin).await;
    }

    let pid = child.id().unwrap_or(0);
    apply_event(&ctx.record, &RunEvent::Launched { pid });
    info!(pid, command = %command, "Process launched");

    let (line_tx, mut line_rx) = mpsc::channel::<(String, bool)>(256);
    let stdout_pump = child
        .stdout
        .take()
        .map(|out| spawn_pump(out, true, line_tx.clone()));
    let stderr_pump = child
        .stderr
        .take()
        .map(|err| spawn_pump(err, false, line_tx.clone()));
    drop(line_tx);

    let mut cancelled = false;
    let mut exit_status = None;

    // The exit poll lives outside the loop. A sleep recreated per iteration
    // would be reset by every received line and never fire under a flood,
    // leaving a fast-exiting child unobserved.
    let mut poll_tick = tokio::time::interval(ctx.poll);

    loop {
        tokio::select! {
            maybe_line = line_rx.recv() => match maybe_line {
                Some((text, is_stdout)) => publish_decoded(&ctx.broadcaster, text, is_stdout),
                // Both pipes hit EOF.
                None => break,
            },
            () = ctx.cancel.cancelled(), if !cancelled => {
                cancelled = true;
                debug!(pid, "Cancellation requested, terminating child");
                terminate_child(&mut child, ctx.grace, ctx.poll).await;
            }
            _ = poll_tick.tick() => {
                if let Ok(Some(status)) = child.try_wait() {
                    exit_status = Some(status);
                    break;
                }
            }
        }
    }

    // Exited, but something (a grandchild, usually) may still hold the pipes
    // open. Drain already-decoded lines up to a bounded deadline, re-checked
    // before every receive so continuous output cannot extend it.
    if exit_status.is_some() {
        let deadline = Instant::now() + DRAIN_WINDOW;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(pid, "Drain window elapsed with pipes still open");
                break;
            }
            match tokio::time::timeout(remaining, line_rx.recv()).await {
                Ok(Some((text, is_stdout))) => {
                    publish_decoded(&ctx.broadcaster, text, is_stdout);
                }
                Ok(None) => break,
                Err(_) => break, // timeout
            }
        }
    }

    if let Some(pump) = stdout_pump {
        pump.abort();
    }
    if let Some(pump) = stderr_pump {
        pump.abort();
    }

    // EOF on the pipes does not mean the child exited; it may have closed
    // its own descriptors and kept running. Keep waiting, still cancellable.
    let status = match exit_status {
        Some(status) => Some(status),
        None => wait_for_exit(&mut child, &ctx.cancel, &mut cancelled, ctx.grace, ctx.poll).await,
    };

    ctx.input.close().await;

    match status {
        Some(status) => {
            let exit_code = status.code().unwrap_or(-1);
            info!(pid, exit_code, cancelled, "Process exited");
            if cancelled {
                apply_event(&ctx.record, &RunEvent::Killed);
            } else {
                apply_event(&ctx.record, &RunEvent::Exited { exit_code });
            }
        }
        None => {
            ctx.broadcaster.publish(OutputLine::stderr(format!(
                "{DIAG_PREFIX} lost track of process {pid}"
            )));
            apply_event(&ctx.record, &RunEvent::Faulted);
        }
    }
}

/// Reads lines off one pipe and forwards them, tagged with their channel, to
/// the listener. A decode failure (for example invalid UTF-8) ends the pump
/// after queueing a diagnostic line; the other channel keeps flowing.
fn spawn_pump<R>(reader: R, is_stdout: bool, tx: mpsc::Sender<(String, bool)>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let channel = if is_stdout { "stdout" } else { "stderr" };
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(text)) => {
                    if tx.send((text, is_stdout)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(channel, error = %e, "Output pump stopped on decode error");
                    let _ = tx
                        .send((format!("{DIAG_PREFIX} {channel} decode error: {e}"), false))
                        .await;
                    break;
                }
            }
        }
    })
}

/// Stamps and publishes one decoded line. Lines are constructed here, at the
/// single publish point, so timestamps are non-decreasing in stream order
/// even when stdout and stderr race through their pumps.
fn publish_decoded(broadcaster: &OutputBroadcaster, text: String, is_stdout: bool) {
    let line = if is_stdout {
        OutputLine::stdout(text)
    } else {
        OutputLine::stderr(text)
    };
    broadcaster.publish(line);
}

/// Polls until the child exits, terminating it if cancellation fires.
async fn wait_for_exit(
    child: &mut Child,
    cancel: &CancellationToken,
    cancelled: &mut bool,
    grace: Duration,
    poll: Duration,
) -> Option<std::process::ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "try_wait failed");
                return None;
            }
        }
        tokio::select! {
            () = cancel.cancelled(), if !*cancelled => {
                *cancelled = true;
                terminate_child(child, grace, poll).await;
            }
            () = tokio::time::sleep(poll) => {}
        }
    }
}

/// Terminates the child: SIGTERM, then up to `grace` of polling, then
/// SIGKILL. Non-Unix platforms only have the hard kill.
#[cfg(unix)]
async fn terminate_child(child: &mut Child, grace: Duration, poll: Duration) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(raw) = child.id() else {
        // Already exited.
        return;
    };
    let pid = Pid::from_raw(raw as i32);

    debug!(%pid, "Sending SIGTERM");
    let _ = kill(pid, Signal::SIGTERM);

    let start = Instant::now();
    while start.elapsed() < grace {
        if matches!(child.try_wait(), Ok(Some(_))) {
            return;
        }
        tokio::time::sleep(poll).await;
    }

    debug!(%pid, "Grace period expired, sending SIGKILL");
    let _ = kill(pid, Signal::SIGKILL);
}

#[allow(clippy::unused_async)] // Signature parity with the Unix implementation
#[cfg(not(unix))]
async fn terminate_child(child: &mut Child, _grace: Duration, _poll: Duration) {
    let _ = child.start_kill();
}

/// Hard-kills a process by pid, used when the listener cannot be waited on.
#[cfg(unix)]
fn kill_by_pid(pid: u32) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    // pid 0 would signal our whole process group.
    if pid == 0 {
        return;
    }
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
}

#[cfg(not(unix))]
fn kill_by_pid(_pid: u32) {
    // Covered by aborting the listener: the child is spawned with
    // kill_on_drop, so dropping it kills it.
}

fn snapshot(record: &RwLock<ProcessRecord>) -> ProcessRecord {
    match record.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn apply_event(record: &RwLock<ProcessRecord>, event: &RunEvent) -> ProcessRecord {
    let mut guard = match record.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let next = guard.apply(event, Utc::now());
    *guard = next.clone();
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let sup = ProcessSupervisor::default();
        let err = sup
            .start("", vec![], None, LaunchMode::Batch)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert!(sup.current_record().is_none());
    }

    #[tokio::test]
    async fn test_whitespace_command_is_rejected() {
        let sup = ProcessSupervisor::default();
        let err = sup
            .start("   \t ", vec![], None, LaunchMode::Batch)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        assert!(sup.current_record().is_none());
    }

    #[tokio::test]
    async fn test_send_input_with_no_process() {
        let sup = ProcessSupervisor::default();
        let err = sup.send_input("hello\n").await.unwrap_err();
        assert!(matches!(err, EngineError::ProcessNotRunning));
    }

    #[tokio::test]
    async fn test_send_signal_with_no_process() {
        let sup = ProcessSupervisor::default();
        for signal in [Signal::Interrupt, Signal::Terminate, Signal::Continue] {
            let err = sup.send_signal(signal).await.unwrap_err();
            assert!(matches!(err, EngineError::ProcessNotRunning));
        }
    }

    #[tokio::test]
    async fn test_resize_without_terminal() {
        let sup = ProcessSupervisor::default();
        let err = sup.resize(120, 40).unwrap_err();
        assert!(matches!(err, EngineError::NoActiveTerminal));
    }

    #[tokio::test]
    async fn test_resize_rejects_zero_dimensions() {
        let sup = ProcessSupervisor::default();
        let err = sup.resize(0, 40).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
        let err = sup.resize(80, 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_stop_with_no_process_is_noop() {
        let sup = ProcessSupervisor::default();
        sup.stop(true).await.unwrap();
        sup.stop(false).await.unwrap();
    }

    #[tokio::test]
    async fn test_is_command_available_rejects_empty() {
        let sup = ProcessSupervisor::default();
        let err = sup.is_command_available("  ").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_everything_fails_after_shutdown() {
        let sup = ProcessSupervisor::default();
        sup.shutdown().await;
        sup.shutdown().await; // idempotent

        assert!(matches!(
            sup.start("echo", vec![], None, LaunchMode::Batch).await,
            Err(EngineError::Disposed)
        ));
        assert!(matches!(
            sup.execute_and_wait("echo", vec![], None).await,
            Err(EngineError::Disposed)
        ));
        assert!(matches!(sup.stop(true).await, Err(EngineError::Disposed)));
        assert!(matches!(
            sup.send_input("x").await,
            Err(EngineError::Disposed)
        ));
        assert!(matches!(
            sup.send_signal(Signal::Interrupt).await,
            Err(EngineError::Disposed)
        ));
        assert!(matches!(sup.resize(80, 24), Err(EngineError::Disposed)));
        assert!(matches!(
            sup.is_command_available("echo").await,
            Err(EngineError::Disposed)
        ));

        // The stream is closed rather than erroring.
        let mut stream = sup.subscribe();
        assert!(stream.recv().await.is_none());
    }
}
