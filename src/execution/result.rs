//! Execution result types.

use std::time::Duration;

use crate::process::EXIT_ABNORMAL;

/// Result of a synchronous execution.
///
/// `succeeded` is about the library: whether the child could be set up,
/// run and waited on. The child's own outcome is `exit_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The child's exit status, or `-1` if it died abnormally.
    pub exit_code: i32,
    /// Whether the process was created and waited on.
    pub succeeded: bool,
    /// Combined stdout/stderr, present only when `succeeded`.
    pub output: Option<Vec<u8>>,
    /// Why the execution failed, present only when not `succeeded`.
    pub error_message: Option<String>,
    /// Whether output past the size cap was dropped.
    pub truncated: bool,
    /// Wall time from spawn to exit.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a result for a child that ran to completion.
    pub fn completed(exit_code: i32, output: Vec<u8>, duration: Duration) -> Self {
        Self {
            exit_code,
            succeeded: true,
            output: Some(output),
            error_message: None,
            truncated: false,
            duration,
        }
    }

    /// Create a result for an execution that could not be carried out.
    pub fn failed(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            exit_code: EXIT_ABNORMAL,
            succeeded: false,
            output: None,
            error_message: Some(message.into()),
            truncated: false,
            duration,
        }
    }

    /// Mark the output as truncated.
    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Check if the child ran and exited with status 0.
    pub fn success(&self) -> bool {
        self.succeeded && self.exit_code == 0
    }

    /// Captured bytes, empty if there are none.
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_deref().unwrap_or_default()
    }

    /// Captured output decoded as UTF-8 (lossy).
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(self.output_bytes()).into_owned()
    }

    /// Get output as string, trimmed.
    pub fn output_trimmed(&self) -> String {
        self.output_text().trim().to_string()
    }

    /// Get output lines.
    pub fn output_lines(&self) -> Vec<String> {
        self.output_text().lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed() {
        let result = ExecutionResult::completed(0, b"hello\n".to_vec(), Duration::from_millis(5));

        assert!(result.succeeded);
        assert!(result.success());
        assert_eq!(result.output_bytes(), b"hello\n");
        assert!(result.error_message.is_none());
        assert!(!result.truncated);
    }

    #[test]
    fn test_nonzero_exit_is_not_a_failure() {
        let result = ExecutionResult::completed(3, Vec::new(), Duration::ZERO);
        assert!(result.succeeded);
        assert!(!result.success());
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_failed() {
        let result = ExecutionResult::failed("memory allocation failed", Duration::ZERO);

        assert!(!result.succeeded);
        assert!(result.output.is_none());
        assert_eq!(
            result.error_message.as_deref(),
            Some("memory allocation failed")
        );
        assert_eq!(result.exit_code, EXIT_ABNORMAL);
        assert!(result.output_bytes().is_empty());
    }

    #[test]
    fn test_output_trimmed() {
        let result = ExecutionResult::completed(0, b"  hello world  \n".to_vec(), Duration::ZERO);
        assert_eq!(result.output_trimmed(), "hello world");
    }

    #[test]
    fn test_output_lines() {
        let result = ExecutionResult::completed(0, b"line1\nline2\nline3".to_vec(), Duration::ZERO);
        assert_eq!(result.output_lines(), vec!["line1", "line2", "line3"]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let result = ExecutionResult::completed(0, vec![b'o', b'k', 0xff], Duration::ZERO);
        assert!(result.output_text().starts_with("ok"));
    }
}
