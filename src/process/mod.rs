//! Process backends and the polling handle.
//!
//! Process creation, waiting and pipe draining differ between Win32 and
//! POSIX. Each platform family implements [`ProcessBackend`]; the rest of
//! the crate only talks to [`NativeBackend`].
//!
//! ## Platform Support
//!
//! - **Unix**: `/bin/sh -c`, `O_NONBLOCK` pipe reads, polled waits
//! - **Windows**: `cmd.exe /C`, `PeekNamedPipe` drains, native handle waits

mod handle;
#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

pub use handle::{spawn, AsyncProcess};

use std::io::{self, PipeReader, Read};
use std::process::{Child, ExitStatus};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::ProcessError;
use crate::execution::{Command, OutputBuffer, READ_CHUNK_SIZE};
use crate::last_error;
use crate::Result;

/// Backend for the current platform.
#[cfg(unix)]
pub type NativeBackend = unix::UnixBackend;

/// Backend for the current platform.
#[cfg(windows)]
pub type NativeBackend = windows::WindowsBackend;

/// Exit code reported for abnormal termination, a running process, or an
/// inactive handle.
pub const EXIT_ABNORMAL: i32 = -1;

/// Exit code of a child that could not enter its working directory or
/// exec its program.
pub const EXIT_LAUNCH_FAILED: i32 = 127;

/// Default interval between liveness checks on platforms without a
/// waitable process handle.
///
/// Shorter intervals lower wake-up latency at the cost of more syscalls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Terminal state of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// The child exited with this status.
    Exited(i32),
    /// The child was terminated by this signal.
    Signaled(i32),
}

impl ExitState {
    /// The exit code, or [`EXIT_ABNORMAL`] for a signal death.
    pub fn code(&self) -> i32 {
        match self {
            ExitState::Exited(code) => *code,
            ExitState::Signaled(_) => EXIT_ABNORMAL,
        }
    }

    /// Whether the child exited normally.
    pub fn is_normal(&self) -> bool {
        matches!(self, ExitState::Exited(_))
    }
}

/// Outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The process has exited.
    Finished,
    /// The timeout elapsed with the process still alive.
    TimedOut,
}

/// A freshly spawned child and the read end of its output pipe.
#[derive(Debug)]
pub struct Spawned {
    pub child: Child,
    pub reader: PipeReader,
}

/// Per-platform process primitives.
///
/// `spawn`, `poll` and `kill` have shared implementations built on
/// `std::process`; the platform supplies the shell invocation, the pipe
/// mode, the drain, the bounded wait and status decoding. Closing is
/// dropping the [`Spawned`] parts.
pub trait ProcessBackend {
    /// Build the shell invocation for `command`.
    fn shell_command(command: &Command) -> std::process::Command;

    /// Put the parent's read end into the mode polling drains need.
    fn prepare_reader(reader: &PipeReader) -> io::Result<()>;

    /// Move currently available bytes into `buffer` without blocking.
    ///
    /// Reads no more than `buffer.room()`; anything beyond stays in the
    /// pipe. Returns the number of bytes moved.
    fn drain(reader: &mut PipeReader, buffer: &mut OutputBuffer) -> Result<usize>;

    /// Block for at most `timeout` waiting for `child` to exit.
    ///
    /// Returns `None` on timeout.
    fn wait_timeout(
        child: &mut Child,
        timeout: Duration,
        poll_interval: Duration,
    ) -> io::Result<Option<ExitStatus>>;

    /// Translate a platform exit status.
    fn exit_state(status: ExitStatus) -> ExitState;

    /// Spawn `command` with stdout and stderr sharing one pipe.
    ///
    /// Every handle opened here is owned, so an early return releases it.
    fn spawn(command: &Command, nonblocking: bool) -> Result<Spawned> {
        let (reader, writer) = io::pipe().map_err(ProcessError::Pipe)?;
        let stderr = writer.try_clone().map_err(ProcessError::Pipe)?;
        if nonblocking {
            Self::prepare_reader(&reader).map_err(ProcessError::Pipe)?;
        }

        let mut shell = Self::shell_command(command);
        shell.stdout(writer).stderr(stderr);

        let child = shell.spawn().map_err(|source| {
            error!("Failed to spawn '{}': {}", command.command_line, source);
            ProcessError::Spawn {
                command: command.command_line.clone(),
                source,
            }
        })?;
        // The builder still owns the parent's copies of the write end;
        // EOF only arrives once they are closed.
        drop(shell);

        debug!("Spawned process {} for '{}'", child.id(), command.command_line);
        Ok(Spawned { child, reader })
    }

    /// Non-blocking liveness query.
    fn poll(child: &mut Child) -> io::Result<Option<ExitStatus>> {
        child.try_wait()
    }

    /// Request unconditional termination.
    fn kill(child: &mut Child) -> io::Result<()> {
        child.kill()
    }
}

/// Read `reader` to EOF into `buffer`, discarding what exceeds the cap.
///
/// Used by the blocking runner. Read errors end the capture early but
/// keep what was gathered.
pub(crate) fn read_to_end(reader: &mut PipeReader, buffer: &mut OutputBuffer) {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut warned = false;

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => match buffer.push(&chunk[..n]) {
                Ok(_) => {
                    if buffer.is_truncated() && !warned {
                        warn!("Output exceeded cap, discarding the rest");
                        warned = true;
                    }
                }
                Err(err) => {
                    last_error::record(&err);
                    warn!("Stopped capturing output: {}", err);
                    warned = true;
                }
            },
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Output pipe read failed: {}", e);
                break;
            }
        }
    }
}
