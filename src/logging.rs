//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is set.
pub const DEFAULT_FILTER: &str = "shell_proc=info";

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `shell_proc=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    try_init_with(filter)
}

/// Try to initialize logging with an explicit level or filter directive.
///
/// A bare level such as `debug` applies to this crate only; anything
/// else is parsed as an `EnvFilter` directive. Invalid input falls back to
/// the default filter.
pub fn try_init_with_filter(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    try_init_with(filter_for(level))
}

fn filter_for(level: &str) -> EnvFilter {
    let directive = match level {
        "error" | "warn" | "info" | "debug" | "trace" => format!("shell_proc={level}"),
        other => other.to_string(),
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn try_init_with(filter: EnvFilter) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        // First call may or may not succeed depending on test order
        let _ = try_init();
        // Second call must not panic either way
        let _ = try_init_with_filter("debug");
    }

    #[test]
    fn test_filter_for_level() {
        assert_eq!(filter_for("debug").to_string(), "shell_proc=debug");
        assert_eq!(filter_for("warn").to_string(), "shell_proc=warn");
    }

    #[test]
    fn test_filter_for_directive() {
        assert_eq!(filter_for("shell_proc=trace").to_string(), "shell_proc=trace");
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init();

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
        // If we get here without panicking, the test passes
    }
}
