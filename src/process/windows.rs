//! Win32 backend: `cmd.exe /C`, `PeekNamedPipe` drains and handle waits.

use std::io::{self, PipeReader, Read};
use std::os::windows::io::AsRawHandle;
use std::os::windows::process::CommandExt;
use std::process::{Child, ExitStatus};
use std::ptr;
use std::time::Duration;

use windows_sys::Win32::Foundation::{WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows_sys::Win32::System::Pipes::PeekNamedPipe;
use windows_sys::Win32::System::Threading::{WaitForSingleObject, CREATE_NO_WINDOW, INFINITE};

use super::{ExitState, ProcessBackend, EXIT_ABNORMAL};
use crate::execution::{Command, OutputBuffer, READ_CHUNK_SIZE};
use crate::Result;

/// The Windows command interpreter every command runs through.
pub const SHELL: &str = "cmd.exe";

/// Win32 process backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl ProcessBackend for WindowsBackend {
    fn shell_command(command: &Command) -> std::process::Command {
        let mut shell = std::process::Command::new(SHELL);
        // raw_arg keeps the caller's quoting intact.
        shell.arg("/C").raw_arg(&command.command_line);

        if let Some(dir) = command.effective_working_dir() {
            shell.current_dir(dir);
        }
        if !command.show_window {
            shell.creation_flags(CREATE_NO_WINDOW);
        }

        shell
    }

    // Anonymous pipes have no non-blocking mode; drains peek first.
    fn prepare_reader(_reader: &PipeReader) -> io::Result<()> {
        Ok(())
    }

    fn drain(reader: &mut PipeReader, buffer: &mut OutputBuffer) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let mut total = 0;

        loop {
            let available = match bytes_available(reader) {
                Ok(0) => break,
                Ok(n) => n as usize,
                // A broken pipe after the child exits reads as "nothing left".
                Err(e) => {
                    tracing::trace!("PeekNamedPipe failed: {}", e);
                    break;
                }
            };
            let want = available.min(chunk.len()).min(buffer.room());
            if want == 0 {
                break;
            }
            let n = reader
                .read(&mut chunk[..want])
                .map_err(crate::ProcessError::Read)?;
            if n == 0 {
                break;
            }
            buffer.push(&chunk[..n])?;
            total += n;
        }

        Ok(total)
    }

    fn wait_timeout(
        child: &mut Child,
        timeout: Duration,
        _poll_interval: Duration,
    ) -> io::Result<Option<ExitStatus>> {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let millis = u32::try_from(timeout.as_millis())
            .unwrap_or(INFINITE - 1)
            .min(INFINITE - 1);
        // SAFETY: the handle is owned by `child` and stays open for the call.
        let result = unsafe { WaitForSingleObject(child.as_raw_handle() as _, millis) };
        if result == WAIT_OBJECT_0 {
            child.try_wait()
        } else if result == WAIT_TIMEOUT {
            Ok(None)
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn exit_state(status: ExitStatus) -> ExitState {
        ExitState::Exited(status.code().unwrap_or(EXIT_ABNORMAL))
    }
}

fn bytes_available(reader: &PipeReader) -> io::Result<u32> {
    let mut available = 0u32;
    // SAFETY: only the out-parameter for the total byte count is written.
    let ok = unsafe {
        PeekNamedPipe(
            reader.as_raw_handle() as _,
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            &mut available,
            ptr::null_mut(),
        )
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_program() {
        let shell = WindowsBackend::shell_command(&Command::new("echo hi"));
        assert_eq!(shell.get_program(), SHELL);
    }

    #[test]
    fn test_exit_code_passthrough() {
        let mut spawned = WindowsBackend::spawn(&Command::new("exit 4"), true).unwrap();
        let status = WindowsBackend::wait_timeout(
            &mut spawned.child,
            Duration::from_secs(10),
            Duration::from_millis(10),
        )
        .unwrap()
        .unwrap();
        assert_eq!(WindowsBackend::exit_state(status), ExitState::Exited(4));
    }
}
