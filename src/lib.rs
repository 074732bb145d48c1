//! # shell-proc
//!
//! Cross-platform shell process execution.
//!
//! Commands run through the platform shell (`/bin/sh -c` on Unix,
//! `cmd.exe /C` on Windows) with stdout and stderr merged into one pipe.
//! Two modes share the same launch path and output cap:
//!
//! - **Synchronous**: [`execute`] blocks until the child exits and returns
//!   an [`ExecutionResult`] with the captured output.
//! - **Polling**: [`AsyncProcess`] returns at once; the caller checks
//!   liveness, waits with a timeout, drains output, kills, and reads the
//!   exit code whenever it chooses.
//!
//! Captured output is capped at [`MAX_OUTPUT_SIZE`] per call; the excess is
//! dropped without an error.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use shell_proc::{execute, AsyncProcess, Command, WaitOutcome};
//!
//! fn main() -> shell_proc::Result<()> {
//!     let result = execute("git status --short", None, false);
//!     if result.succeeded {
//!         println!("exit {}: {}", result.exit_code, result.output_text());
//!     }
//!
//!     let mut server = AsyncProcess::spawn(&Command::new("python3 -m http.server"));
//!     if server.wait_timeout(Duration::from_secs(1))? == WaitOutcome::TimedOut {
//!         server.kill()?;
//!     }
//!     server.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod last_error;
pub mod logging;
pub mod path;
pub mod process;

// Re-export commonly used types
pub use error::{ProcessError, Result};
pub use execution::{
    execute, execute_command, execute_with_args, Command, ExecutionResult, OutputBuffer,
    MAX_OUTPUT_SIZE,
};
pub use last_error::get_last_error;
pub use path::file_in_path;
pub use process::{spawn, AsyncProcess, ExitState, WaitOutcome, EXIT_ABNORMAL, EXIT_LAUNCH_FAILED};
