//! Error types for shell-proc.

use thiserror::Error;

/// Main error type for process operations.
///
/// These are library failures only. A child that runs and exits nonzero
/// is not an error; its outcome is carried by the exit code.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The output pipe could not be created.
    #[error("failed to create output pipe: {0}")]
    Pipe(#[source] std::io::Error),

    /// The operating system refused to create the process.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Allocating the output buffer failed.
    #[error("memory allocation failed")]
    OutOfMemory,

    /// Waiting on the child failed.
    #[error("failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),

    /// The termination request failed.
    #[error("failed to kill process: {0}")]
    Kill(#[source] std::io::Error),

    /// Reading from the output pipe failed.
    #[error("failed to read process output: {0}")]
    Read(#[source] std::io::Error),

    /// The handle never started a process.
    #[error("process handle is not active")]
    Inactive,
}

/// Convenience Result type for shell-proc operations.
pub type Result<T> = std::result::Result<T, ProcessError>;
