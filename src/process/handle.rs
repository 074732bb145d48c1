//! Polling handle over a spawned child.

use std::io::PipeReader;
use std::path::Path;
use std::process::Child;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{
    ExitState, NativeBackend, ProcessBackend, Spawned, WaitOutcome, DEFAULT_POLL_INTERVAL,
    EXIT_ABNORMAL,
};
use crate::error::ProcessError;
use crate::execution::{Command, OutputBuffer};
use crate::last_error;
use crate::Result;

/// Smallest accepted polling interval.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Spawn `command` without waiting for it.
///
/// Shorthand for [`AsyncProcess::spawn`].
pub fn spawn(command: &str, working_dir: Option<&Path>, show_window: bool) -> AsyncProcess {
    let mut cmd = Command::new(command).show_window(show_window);
    if let Some(dir) = working_dir {
        cmd = cmd.working_dir(dir);
    }
    AsyncProcess::spawn(&cmd)
}

struct Running {
    child: Child,
    reader: PipeReader,
    pid: u32,
    /// Terminal state, cached the first time it is observed.
    exit: Option<ExitState>,
}

enum HandleState {
    Started(Running),
    Failed(String),
}

/// A child process that runs while the caller polls it.
///
/// Nothing happens in the background: every query runs on the caller's
/// thread. A handle whose spawn failed stays usable; every lifecycle call
/// reports it as inactive.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use shell_proc::{AsyncProcess, Command, WaitOutcome};
///
/// let mut process = AsyncProcess::spawn(&Command::new("make -j8"));
/// let mut log = Vec::new();
/// loop {
///     if let Some(chunk) = process.read_output() {
///         log.extend_from_slice(&chunk);
///     }
///     if process.wait_timeout(Duration::from_millis(100))? == WaitOutcome::Finished {
///         break;
///     }
/// }
/// println!("exit code {}", process.exit_code());
/// process.close();
/// # Ok::<(), shell_proc::ProcessError>(())
/// ```
pub struct AsyncProcess {
    state: HandleState,
    poll_interval: Duration,
}

impl AsyncProcess {
    /// Start `command` and return immediately.
    ///
    /// Setup failures do not surface as `Err`: the returned handle is
    /// inactive and carries the message in [`error_message`](Self::error_message).
    pub fn spawn(command: &Command) -> Self {
        let state = match NativeBackend::spawn(command, true) {
            Ok(Spawned { child, reader }) => {
                let pid = child.id();
                HandleState::Started(Running {
                    child,
                    reader,
                    pid,
                    exit: None,
                })
            }
            Err(err) => {
                last_error::record(&err);
                HandleState::Failed(err.to_string())
            }
        };

        Self {
            state,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Whether the process was started.
    pub fn started(&self) -> bool {
        matches!(self.state, HandleState::Started(_))
    }

    /// Why the spawn failed, if it did.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            HandleState::Failed(message) => Some(message),
            HandleState::Started(_) => None,
        }
    }

    /// OS process identifier, or 0 if the handle never started.
    pub fn pid(&self) -> u32 {
        match &self.state {
            HandleState::Started(running) => running.pid,
            HandleState::Failed(_) => 0,
        }
    }

    /// Interval between liveness checks in [`wait_timeout`](Self::wait_timeout)
    /// on platforms that poll.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Change the polling interval. Values under 1 ms are raised to 1 ms.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
    }

    /// Check whether the process is still alive without blocking.
    ///
    /// Returns false once the exit state has been observed, for an
    /// inactive handle, and when the status query itself fails.
    pub fn is_running(&mut self) -> bool {
        match self.refresh() {
            Ok(exit) => exit.is_none(),
            Err(_) => false,
        }
    }

    /// The terminal state, if the process has exited.
    pub fn exit_state(&mut self) -> Option<ExitState> {
        self.refresh().ok().flatten()
    }

    /// The exit code once the process has exited.
    ///
    /// Returns `-1` while the process is running, after an abnormal
    /// termination, and for an inactive handle. Use
    /// [`exit_state`](Self::exit_state) to tell those apart. Windows has
    /// no signal deaths: a killed child reports exit code 1 there.
    pub fn exit_code(&mut self) -> i32 {
        self.exit_state()
            .map(|state| state.code())
            .unwrap_or(EXIT_ABNORMAL)
    }

    /// Block for at most `timeout` waiting for the process to exit.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        let poll_interval = self.poll_interval;
        let running = self.running_mut().map_err(fail)?;
        if running.exit.is_some() {
            return Ok(WaitOutcome::Finished);
        }

        match NativeBackend::wait_timeout(&mut running.child, timeout, poll_interval) {
            Ok(Some(status)) => {
                running.exit = Some(NativeBackend::exit_state(status));
                debug!("Process {} exited: {:?}", running.pid, running.exit);
                Ok(WaitOutcome::Finished)
            }
            Ok(None) => Ok(WaitOutcome::TimedOut),
            Err(e) => Err(fail(ProcessError::Wait(e))),
        }
    }

    /// Wait for at most `timeout` from an async context.
    ///
    /// Polls on the caller's task with `tokio::time::sleep` between
    /// checks; no thread is blocked and nothing runs in the background.
    pub async fn wait_async(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        let start = Instant::now();
        loop {
            if self.refresh()?.is_some() {
                return Ok(WaitOutcome::Finished);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(WaitOutcome::TimedOut);
            }
            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
        }
    }

    /// Send an unconditional termination request.
    ///
    /// Success means the request was delivered, not that the process
    /// has exited.
    ///
    /// On Unix the child dies from `SIGKILL` and reads as
    /// [`ExitState::Signaled`]. On Windows `TerminateProcess` leaves an
    /// ordinary exit code of 1, so a killed child reads as `Exited(1)`.
    pub fn kill(&mut self) -> Result<()> {
        let running = self.running_mut().map_err(fail)?;
        debug!("Killing process {}", running.pid);
        NativeBackend::kill(&mut running.child).map_err(|e| fail(ProcessError::Kill(e)))
    }

    /// Drain whatever output is buffered in the pipe, without blocking.
    ///
    /// Returns `None` for an inactive handle or when no bytes are
    /// available right now. Each call yields only bytes produced since the
    /// previous one, at most the output cap per call.
    pub fn read_output(&mut self) -> Option<Vec<u8>> {
        let HandleState::Started(running) = &mut self.state else {
            return None;
        };

        let mut buffer = match OutputBuffer::new() {
            Ok(buffer) => buffer,
            Err(err) => {
                fail(err);
                return None;
            }
        };

        if let Err(err) = NativeBackend::drain(&mut running.reader, &mut buffer) {
            warn!("Draining output of process {} failed: {}", running.pid, err);
            fail(err);
        }

        if buffer.is_empty() {
            None
        } else {
            Some(buffer.into_bytes())
        }
    }

    /// Release the process reference, the pipe and any error text.
    ///
    /// The child is not killed. If it has already exited it is reaped;
    /// a child that is still running is neither killed nor reaped, so on
    /// Unix it lingers as a zombie after it exits until this process ends.
    /// Call [`kill`](Self::kill) and [`wait_timeout`](Self::wait_timeout)
    /// first to release it fully.
    pub fn close(self) {
        drop(self);
    }

    fn running_mut(&mut self) -> Result<&mut Running> {
        match &mut self.state {
            HandleState::Started(running) => Ok(running),
            HandleState::Failed(_) => Err(ProcessError::Inactive),
        }
    }

    /// Observe the exit state, caching it the first time it is seen.
    fn refresh(&mut self) -> Result<Option<ExitState>> {
        let running = self.running_mut()?;
        if running.exit.is_none() {
            match NativeBackend::poll(&mut running.child) {
                Ok(Some(status)) => {
                    running.exit = Some(NativeBackend::exit_state(status));
                    debug!("Process {} exited: {:?}", running.pid, running.exit);
                }
                Ok(None) => {}
                Err(e) => return Err(fail(ProcessError::Wait(e))),
            }
        }
        Ok(running.exit)
    }
}

impl Drop for AsyncProcess {
    fn drop(&mut self) {
        if let HandleState::Started(running) = &mut self.state {
            if running.exit.is_none() {
                // Reap a finished child; a live one keeps running.
                let _ = NativeBackend::poll(&mut running.child);
            }
        }
    }
}

impl std::fmt::Debug for AsyncProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("AsyncProcess");
        match &self.state {
            HandleState::Started(running) => s
                .field("pid", &running.pid)
                .field("exit", &running.exit),
            HandleState::Failed(message) => s.field("error", message),
        };
        s.field("poll_interval", &self.poll_interval).finish()
    }
}

/// Record `err` as the last error and hand it back.
fn fail(err: ProcessError) -> ProcessError {
    last_error::record(&err);
    err
}
