//! Command-line interface for shell-proc.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
    /// Create a visible console window (Windows only).
    pub show_window: bool,
    /// Spawn and poll instead of blocking.
    pub run_async: bool,
    /// Kill the child after this many milliseconds (async mode).
    pub timeout_ms: Option<u64>,
    /// Liveness polling interval in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Only check whether this program is on PATH.
    pub which: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// The program to run, if one was given.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Everything after the program, joined with single spaces.
    pub fn program_args(&self) -> String {
        self.command.get(1..).unwrap_or_default().join(" ")
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('C') | Long("dir") => {
                result.working_dir = Some(parser.value()?.parse()?);
            }
            Short('w') | Long("show-window") => {
                result.show_window = true;
            }
            Short('a') | Long("async") => {
                result.run_async = true;
            }
            Short('t') | Long("timeout") => {
                result.timeout_ms = Some(parse_millis(&mut parser, "timeout")?);
            }
            Short('i') | Long("poll-interval") => {
                let ms = parse_millis(&mut parser, "poll-interval")?;
                if ms == 0 {
                    return Err(ArgsError::InvalidValue("poll-interval", ms.to_string()));
                }
                result.poll_interval_ms = Some(ms);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("which") => {
                result.which = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                // The first positional starts the command; the rest is verbatim.
                result.command.push(val.string()?);
                for raw in parser.raw_args()? {
                    result
                        .command
                        .push(raw.into_string().map_err(|raw| {
                            ArgsError::UnexpectedArgument(raw.to_string_lossy().into())
                        })?);
                }
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_millis(parser: &mut lexopt::Parser, name: &'static str) -> Result<u64, ArgsError> {
    use lexopt::ValueExt;

    let value: String = parser.value()?.parse()?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue(name, value))
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-proc {version}
Run a command through the platform shell and capture its output

USAGE:
    shell-proc [OPTIONS] <PROGRAM> [ARGS]...

OPTIONS:
    -C, --dir <DIR>            Working directory for the command
    -w, --show-window          Show a console window (Windows only)
    -a, --async                Spawn, stream output while polling, then exit
    -t, --timeout <MS>         Kill the command after MS milliseconds (async)
    -i, --poll-interval <MS>   Liveness polling interval [default: 10]
    -c, --config <FILE>        Path to configuration file (JSON)
    -l, --log-level <LVL>      Log level (error, warn, info, debug, trace)
        --which <NAME>         Exit 0 if NAME is on PATH, 1 otherwise
    -h, --help                 Print help
    -V, --version              Print version

ENVIRONMENT VARIABLES:
    SHELL_PROC_WORKING_DIR       Working directory (overrides config)
    SHELL_PROC_SHOW_WINDOW       Show console window (1/true/yes)
    SHELL_PROC_TIMEOUT_MS        Async timeout (overrides config)
    SHELL_PROC_POLL_INTERVAL_MS  Polling interval (overrides config)
    SHELL_PROC_LOG_LEVEL         Log level (overrides config)
    RUST_LOG                     Alternative log level setting

EXAMPLES:
    # Capture output of a pipeline
    shell-proc "ls -la | sort"

    # Run in another directory
    shell-proc -C /tmp make test

    # Stream output, give up after 5 seconds
    shell-proc -a -t 5000 ./long-running-job.sh
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-proc {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Argument that cannot be used.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("shell-proc")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.command.is_empty());
        assert!(result.program().is_none());
        assert!(!result.run_async);
    }

    #[test]
    fn test_program_and_args() {
        let result = parse_args_from(args(&["grep", "-rn", "TODO", "src"])).unwrap();
        assert_eq!(result.program(), Some("grep"));
        assert_eq!(result.program_args(), "-rn TODO src");
    }

    #[test]
    fn test_options_before_program() {
        let result =
            parse_args_from(args(&["-a", "-t", "500", "-C", "/tmp", "sleep", "1"])).unwrap();
        assert!(result.run_async);
        assert_eq!(result.timeout_ms, Some(500));
        assert_eq!(result.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(result.command, vec!["sleep", "1"]);
    }

    #[test]
    fn test_flags_after_program_belong_to_it() {
        let result = parse_args_from(args(&["ls", "-a", "--help"])).unwrap();
        assert!(!result.run_async);
        assert!(!result.help);
        assert_eq!(result.program_args(), "-a --help");
    }

    #[test]
    fn test_which() {
        let result = parse_args_from(args(&["--which", "git"])).unwrap();
        assert_eq!(result.which, Some("git".to_string()));
    }

    #[test]
    fn test_help_flag() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = parse_args_from(args(&["-t", "soon"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_millisecond_options() {
        let result =
            parse_args_from(args(&["--timeout", "2500", "--poll-interval", "25", "true"])).unwrap();
        assert_eq!(result.timeout_ms, Some(2500));
        assert_eq!(result.poll_interval_ms, Some(25));
    }

    #[test]
    fn test_zero_poll_interval() {
        let result = parse_args_from(args(&["-i", "0"]));
        assert!(matches!(result, Err(ArgsError::InvalidValue("poll-interval", _))));
    }

    #[test]
    fn test_unknown_option() {
        let result = parse_args_from(args(&["--frobnicate"]));
        assert!(result.is_err());
    }
}
