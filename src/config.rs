//! Configuration management for shell-proc.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::execution::Command;
use crate::process::DEFAULT_POLL_INTERVAL;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Execution defaults.
    pub execution: ExecutionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Working directory for spawned commands.
    pub working_dir: Option<PathBuf>,
    /// Create a visible console window (Windows only).
    pub show_window: bool,
    /// Kill asynchronous runs after this many milliseconds.
    pub timeout_ms: Option<u64>,
    /// Liveness polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            working_dir: None,
            show_window: false,
            timeout_ms: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var("SHELL_PROC_WORKING_DIR") {
            if !dir.is_empty() {
                self.execution.working_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(show) = std::env::var("SHELL_PROC_SHOW_WINDOW") {
            self.execution.show_window = matches!(show.as_str(), "1" | "true" | "yes");
        }

        if let Ok(ms) = std::env::var("SHELL_PROC_TIMEOUT_MS") {
            self.execution.timeout_ms = Some(parse_millis("SHELL_PROC_TIMEOUT_MS", &ms)?);
        }

        if let Ok(ms) = std::env::var("SHELL_PROC_POLL_INTERVAL_MS") {
            self.execution.poll_interval_ms = parse_millis("SHELL_PROC_POLL_INTERVAL_MS", &ms)?;
        }

        if let Ok(level) = std::env::var("SHELL_PROC_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref dir) = args.working_dir {
            self.execution.working_dir = Some(dir.clone());
        }

        if args.show_window {
            self.execution.show_window = true;
        }

        if let Some(ms) = args.timeout_ms {
            self.execution.timeout_ms = Some(ms);
        }

        if let Some(ms) = args.poll_interval_ms {
            self.execution.poll_interval_ms = ms;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms",
                "0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a command carrying the configured launch options.
    pub fn command(&self, command_line: impl Into<String>) -> Command {
        let mut command = Command::new(command_line).show_window(self.execution.show_window);
        if let Some(ref dir) = self.execution.working_dir {
            command = command.working_dir(dir);
        }
        command
    }

    /// Polling interval for asynchronous runs.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.execution.poll_interval_ms)
    }

    /// Timeout for asynchronous runs, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.execution.timeout_ms.map(Duration::from_millis)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name, value.to_string()))
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A setting has an unusable value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidValue(name, value) => write!(f, "invalid value for {}: '{}'", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}
