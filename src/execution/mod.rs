//! Synchronous command execution.
//!
//! This module provides:
//! - [`Command`]: a shell command line with its launch options
//! - [`execute`] and friends: run to completion, capturing combined output
//! - [`OutputBuffer`]: the capped accumulator both execution modes share
//!
//! # Example
//!
//! ```no_run
//! use shell_proc::execution::{execute, execute_command, Command};
//!
//! // Simple one-shot execution
//! let result = execute("echo hello", None, false);
//! println!("Output: {}", result.output_text());
//!
//! // Command with options
//! let cmd = Command::new("cargo build").working_dir("/project");
//! let result = execute_command(&cmd);
//! assert!(result.succeeded);
//! ```

mod buffer;
mod command;
mod result;
mod runner;

pub use buffer::{Append, OutputBuffer, INITIAL_CAPACITY, MAX_OUTPUT_SIZE, READ_CHUNK_SIZE};
pub use command::Command;
pub use result::ExecutionResult;
pub use runner::{execute, execute_command, execute_with_args};
