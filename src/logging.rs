//! Tracing subscriber setup.
//!
//! The terminal UI owns stdout/stderr while it runs, so in UI mode logs go to a
//! file (or nowhere). Headless subcommands log to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, exit};

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

impl LogTarget {
    /// UI mode: the configured file, otherwise nothing.
    pub fn for_ui(log_file: Option<PathBuf>) -> Self {
        log_file.map_or(LogTarget::Discard, LogTarget::File)
    }

    /// Headless mode: the configured file, otherwise stderr.
    pub fn for_headless(log_file: Option<PathBuf>) -> Self {
        log_file.map_or(LogTarget::Stderr, LogTarget::File)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(target: &LogTarget) -> Result<(), AppError> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(false);

    // `try_init` only fails when a subscriber is already installed.
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(exit::USAGE, format!("Failed to open log file {}: {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_mode_never_logs_to_the_terminal() {
        assert_eq!(LogTarget::for_ui(None), LogTarget::Discard);
        assert_eq!(
            LogTarget::for_ui(Some(PathBuf::from("income.log"))),
            LogTarget::File(PathBuf::from("income.log"))
        );
        assert_eq!(LogTarget::for_headless(None), LogTarget::Stderr);
    }

    #[test]
    fn unwritable_log_file_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = init(&LogTarget::File(dir.path().join("missing").join("income.log"))).unwrap_err();
        assert_eq!(err.exit_code(), exit::USAGE);
    }
}
