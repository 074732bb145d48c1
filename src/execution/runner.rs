//! Blocking execution with captured output.

use std::path::Path;
use std::time::Instant;

use tracing::debug;

use super::buffer::OutputBuffer;
use super::command::Command;
use super::result::ExecutionResult;
use crate::error::ProcessError;
use crate::last_error;
use crate::process::{self, NativeBackend, ProcessBackend, Spawned};
use crate::Result;

/// Run `command` through the platform shell and wait for it.
///
/// `working_dir` is ignored when `None` or empty. `show_window` only
/// matters on Windows.
pub fn execute(command: &str, working_dir: Option<&Path>, show_window: bool) -> ExecutionResult {
    let mut cmd = Command::new(command).show_window(show_window);
    if let Some(dir) = working_dir {
        cmd = cmd.working_dir(dir);
    }
    execute_command(&cmd)
}

/// Run `program` with `args` appended after a single space.
///
/// The arguments are not quoted; see [`Command::with_args`].
pub fn execute_with_args(
    program: &str,
    args: &str,
    working_dir: Option<&Path>,
    show_window: bool,
) -> ExecutionResult {
    let mut cmd = Command::with_args(program, args).show_window(show_window);
    if let Some(dir) = working_dir {
        cmd = cmd.working_dir(dir);
    }
    execute_command(&cmd)
}

/// Run a prepared [`Command`] and wait for it.
///
/// Library failures produce `succeeded == false` with an error message
/// and also overwrite the last-error text. A child that exits nonzero is
/// a successful execution.
pub fn execute_command(command: &Command) -> ExecutionResult {
    let start = Instant::now();
    match run(command) {
        Ok((exit_code, buffer)) => {
            let truncated = buffer.is_truncated();
            debug!(
                "'{}' exited with {} after {:?} ({} bytes)",
                command.command_line,
                exit_code,
                start.elapsed(),
                buffer.len()
            );
            ExecutionResult::completed(exit_code, buffer.into_bytes(), start.elapsed())
                .with_truncated(truncated)
        }
        Err(err) => {
            last_error::record(&err);
            ExecutionResult::failed(err.to_string(), start.elapsed())
        }
    }
}

fn run(command: &Command) -> Result<(i32, OutputBuffer)> {
    // Allocated up front so an allocation failure leaves no child behind.
    let mut buffer = OutputBuffer::new()?;
    let Spawned {
        mut child,
        mut reader,
    } = NativeBackend::spawn(command, false)?;

    process::read_to_end(&mut reader, &mut buffer);
    drop(reader);

    let status = child.wait().map_err(ProcessError::Wait)?;
    Ok((NativeBackend::exit_state(status).code(), buffer))
}
