//! Platform-specific shell detection.

use std::path::PathBuf;

/// The shell used to run command strings.
///
/// `$SHELL` (falling back to `/bin/sh`) on Unix, `%COMSPEC%` (falling back
/// to `cmd.exe`) on Windows.
pub fn detect_shell() -> PathBuf {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("cmd.exe"))
    } else {
        std::env::var("SHELL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/bin/sh"))
    }
}

/// The flag that makes the shell run its next argument as a command.
pub fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-c"
    }
}

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_shell_is_never_empty() {
        assert!(!detect_shell().as_os_str().is_empty());
    }

    #[test]
    fn shell_flag_matches_platform() {
        if cfg!(target_os = "windows") {
            assert_eq!(shell_flag(), "/C");
        } else {
            assert_eq!(shell_flag(), "-c");
        }
    }

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }
}
