//! PATH lookup.

/// Check whether `name` resolves to an executable on the search path.
///
/// On Windows the lookup honors `PATHEXT`, so `"cmd"` finds `cmd.exe`.
pub fn file_in_path(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    which::which(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name() {
        assert!(!file_in_path(""));
    }

    #[test]
    fn test_missing_program() {
        assert!(!file_in_path("shell-proc-no-such-program-4f1c"));
    }

    #[test]
    #[cfg(unix)]
    fn test_shell_found() {
        assert!(file_in_path("sh"));
    }

    #[test]
    #[cfg(windows)]
    fn test_cmd_found() {
        assert!(file_in_path("cmd"));
    }
}
