//! POSIX backend: `/bin/sh -c`, non-blocking fds and polled waits.

use std::ffi::CString;
use std::io::{self, PipeReader, Read};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

use super::{ExitState, ProcessBackend, EXIT_ABNORMAL, EXIT_LAUNCH_FAILED};
use crate::error::ProcessError;
use crate::execution::{Command, OutputBuffer, READ_CHUNK_SIZE};
use crate::Result;

/// The POSIX shell every command runs through.
pub const SHELL: &str = "/bin/sh";

/// POSIX process backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixBackend;

impl ProcessBackend for UnixBackend {
    fn shell_command(command: &Command) -> std::process::Command {
        let mut shell = std::process::Command::new(SHELL);
        shell.arg("-c").arg(&command.command_line);

        // The directory change happens in the child so that a bad path
        // becomes exit status 127 instead of running somewhere else.
        if let Some(dir) = command.effective_working_dir() {
            let dir = CString::new(dir.as_os_str().as_bytes()).ok();
            // SAFETY: chdir and _exit are async-signal-safe, and the closure
            // only touches memory allocated before the fork.
            unsafe {
                shell.pre_exec(move || {
                    match &dir {
                        Some(path) if libc::chdir(path.as_ptr()) == 0 => {}
                        _ => libc::_exit(EXIT_LAUNCH_FAILED),
                    }
                    Ok(())
                });
            }
        }

        shell
    }

    fn prepare_reader(reader: &PipeReader) -> io::Result<()> {
        set_nonblocking(reader.as_raw_fd())
    }

    fn drain(reader: &mut PipeReader, buffer: &mut OutputBuffer) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let mut total = 0;

        loop {
            let want = buffer.room().min(chunk.len());
            if want == 0 {
                break;
            }
            match reader.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    buffer.push(&chunk[..n])?;
                    total += n;
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if total == 0 => return Err(ProcessError::Read(e)),
                Err(e) => {
                    tracing::warn!("Output pipe read failed after {} bytes: {}", total, e);
                    break;
                }
            }
        }

        Ok(total)
    }

    fn wait_timeout(
        child: &mut Child,
        timeout: Duration,
        poll_interval: Duration,
    ) -> io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(None);
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }
    }

    fn exit_state(status: ExitStatus) -> ExitState {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitState::Exited(code),
            (None, Some(signal)) => ExitState::Signaled(signal),
            (None, None) => ExitState::Exited(EXIT_ABNORMAL),
        }
    }
}

fn set_nonblocking(fd: std::os::unix::io::RawFd) -> io::Result<()> {
    // SAFETY: fd is a live descriptor borrowed from the reader.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above.
    let ret = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_program() {
        let shell = UnixBackend::shell_command(&Command::new("echo hi"));
        assert_eq!(shell.get_program(), SHELL);
        let args: Vec<_> = shell.get_args().collect();
        assert_eq!(args, vec!["-c", "echo hi"]);
    }

    #[test]
    fn test_bad_working_dir_exits_127() {
        let command = Command::new("echo unreachable").working_dir("/definitely/not/here");
        let mut spawned = UnixBackend::spawn(&command, false).unwrap();
        let status = spawned.child.wait().unwrap();
        assert_eq!(UnixBackend::exit_state(status), ExitState::Exited(127));
    }

    #[test]
    fn test_signal_exit_state() {
        let mut spawned = UnixBackend::spawn(&Command::new("kill -9 $$"), false).unwrap();
        let status = spawned.child.wait().unwrap();
        assert_eq!(
            UnixBackend::exit_state(status),
            ExitState::Signaled(libc::SIGKILL)
        );
    }

    #[test]
    fn test_drain_empty_pipe_does_not_block() {
        let mut spawned = UnixBackend::spawn(&Command::new("sleep 1"), true).unwrap();
        let mut buffer = OutputBuffer::new().unwrap();

        let started = Instant::now();
        let moved = UnixBackend::drain(&mut spawned.reader, &mut buffer).unwrap();
        assert_eq!(moved, 0);
        assert!(started.elapsed() < Duration::from_millis(500));

        UnixBackend::kill(&mut spawned.child).unwrap();
        spawned.child.wait().unwrap();
    }

    #[test]
    fn test_wait_timeout_expires() {
        let mut spawned = UnixBackend::spawn(&Command::new("sleep 2"), true).unwrap();
        let status = UnixBackend::wait_timeout(
            &mut spawned.child,
            Duration::from_millis(50),
            Duration::from_millis(10),
        )
        .unwrap();
        assert!(status.is_none());

        UnixBackend::kill(&mut spawned.child).unwrap();
        spawned.child.wait().unwrap();
    }
}
