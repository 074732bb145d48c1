//! Synchronous execution integration tests.
//!
//! These run real commands through `/bin/sh`, so they are Unix-only.

#![cfg(unix)]

use std::path::Path;

use shell_proc::{
    execute, execute_command, execute_with_args, get_last_error, Command, EXIT_ABNORMAL,
    EXIT_LAUNCH_FAILED, MAX_OUTPUT_SIZE,
};

// ============================================================================
// Exit Status Tests
// ============================================================================

#[test]
fn test_exit_status_passthrough() {
    let result = execute("exit 3", None, false);

    assert!(result.succeeded);
    assert_eq!(result.exit_code, 3);
    assert!(result.error_message.is_none());
    assert_eq!(result.output_bytes(), b"");
}

#[test]
fn test_missing_program_is_127() {
    let result = execute("shell-proc-no-such-binary-91d2", None, false);

    // The shell started fine and reported the failure itself.
    assert!(result.succeeded);
    assert_eq!(result.exit_code, EXIT_LAUNCH_FAILED);
}

#[test]
fn test_signal_death_is_abnormal() {
    let result = execute("kill -9 $$", None, false);

    assert!(result.succeeded);
    assert_eq!(result.exit_code, EXIT_ABNORMAL);
}

// ============================================================================
// Output Capture Tests
// ============================================================================

#[test]
fn test_stdout_and_stderr_interleaved() {
    let result = execute("echo one; echo two >&2; echo three", None, false);

    assert_eq!(result.output_text(), "one\ntwo\nthree\n");
}

#[test]
fn test_embedded_nul_bytes() {
    let result = execute(r"printf 'a\000b'", None, false);

    assert_eq!(result.output_bytes(), b"a\0b");
}

#[test]
fn test_output_one_past_initial_capacity() {
    let result = execute("head -c 4097 /dev/zero", None, false);

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output_bytes().len(), 4097);
    assert!(!result.truncated);
}

#[test]
fn test_output_over_cap_is_truncated() {
    let result = execute("head -c 3000000 /dev/zero", None, false);

    assert!(result.succeeded);
    // The child is not cut off by the cap.
    assert_eq!(result.exit_code, 0);
    assert!(result.truncated);
    assert!(result.output_bytes().len() < MAX_OUTPUT_SIZE);
    assert!(result.output_bytes().len() > MAX_OUTPUT_SIZE / 2);
}

// ============================================================================
// Working Directory Tests
// ============================================================================

#[test]
fn test_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let result = execute("pwd", Some(dir.path()), false);

    let name = dir.path().file_name().unwrap().to_str().unwrap();
    assert_eq!(result.exit_code, 0);
    assert!(result.output_trimmed().ends_with(name));
}

#[test]
fn test_bad_working_dir_is_127() {
    let result = execute(
        "echo should-not-run",
        Some(Path::new("/nonexistent/shell-proc")),
        false,
    );

    assert!(result.succeeded);
    assert_eq!(result.exit_code, EXIT_LAUNCH_FAILED);
    assert!(!result.output_text().contains("should-not-run"));
}

#[test]
fn test_empty_working_dir_is_ignored() {
    let result = execute("true", Some(Path::new("")), false);
    assert_eq!(result.exit_code, 0);
}

// ============================================================================
// Argument Concatenation Tests
// ============================================================================

#[test]
fn test_execute_with_args() {
    let result = execute_with_args("echo", "alpha beta", None, false);
    assert_eq!(result.output_text(), "alpha beta\n");
}

#[test]
fn test_execute_with_args_no_quoting() {
    // Shell metacharacters in args reach the shell untouched.
    let result = execute_with_args("echo", "left; echo right", None, false);
    assert_eq!(result.output_lines(), vec!["left", "right"]);
}

#[test]
fn test_execute_with_empty_args() {
    let result = execute_with_args("echo", "", None, false);
    assert_eq!(result.output_text(), "\n");
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_setup_failure_reports_error() {
    let result = execute_command(&Command::new("echo \0 nul"));

    assert!(!result.succeeded);
    assert!(result.output.is_none());
    assert!(result.error_message.is_some());
    assert!(!get_last_error().is_empty());
}

#[test]
fn test_show_window_is_noop() {
    let result = execute("echo visible", None, true);
    assert_eq!(result.output_trimmed(), "visible");
}
