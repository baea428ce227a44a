//! Log file setup.
//!
//! Events go to a daily rolling file in the `logs` directory next to the
//! config file. `RUST_LOG` takes precedence over the default level. When that
//! directory cannot be created, events go to stderr instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::constants;

/// Directory holding the log files for a given config file.
#[must_use]
pub fn log_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(constants::LOGS_DIR_NAME)
}

/// Default filter directive.
fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Non-blocking writer to the daily log file in `dir`, creating `dir` first.
fn file_writer(dir: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::daily(dir, constants::LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
///
/// An unusable log directory never stops the run; logging then falls back
/// to stderr.
#[must_use]
pub fn init(dir: &Path, verbose: bool) -> WorkerGuard {
    let (writer, guard, unavailable) = match file_writer(dir) {
        Ok((writer, guard)) => (writer, guard, None),
        Err(e) => {
            let (writer, guard) = tracing_appender::non_blocking(io::stderr());
            (writer, guard, Some(e))
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    if let Some(e) = unavailable {
        warn!(dir = %dir.display(), error = %e, "log directory unavailable, logging to stderr");
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_next_to_config() {
        let dir = log_dir(Path::new("/home/jane/.config/emplocli/config.toml"));
        assert_eq!(dir, PathBuf::from("/home/jane/.config/emplocli/logs"));
    }

    #[test]
    fn test_log_dir_for_bare_file_name() {
        assert_eq!(log_dir(Path::new("x.toml")), PathBuf::from("logs"));
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "info");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn test_file_writer_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("emplocli").join("logs");

        let (_writer, _guard) = file_writer(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_writer_unusable_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("config.toml");
        fs::write(&blocker, "").unwrap();

        // a regular file where the directory should go
        assert!(file_writer(&blocker.join("logs")).is_err());
    }
}
