//! Command building and representation.

use std::path::{Path, PathBuf};

/// A shell command line plus the options it is launched with.
///
/// The command line is handed verbatim to the platform shell; quoting is
/// the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// The command line to execute.
    pub command_line: String,
    /// Working directory for the child (if any).
    pub working_dir: Option<PathBuf>,
    /// Whether to create a visible console window (Windows only).
    pub show_window: bool,
}

impl Command {
    /// Create a new command with the given command line.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            working_dir: None,
            show_window: false,
        }
    }

    /// Build a command line from a program and an argument string.
    ///
    /// The two are joined with a single space. An empty `args` leaves the
    /// program unmodified. No quoting is applied.
    pub fn with_args(program: &str, args: &str) -> Self {
        if args.is_empty() {
            Self::new(program)
        } else {
            Self::new(format!("{program} {args}"))
        }
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set whether to show a console window.
    pub fn show_window(mut self, show: bool) -> Self {
        self.show_window = show;
        self
    }

    /// The working directory to switch into, ignoring empty paths.
    pub fn effective_working_dir(&self) -> Option<&Path> {
        self.working_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}
