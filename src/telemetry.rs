//! Logging setup for processes that host a predictor.
//!
//! The library itself only emits `tracing` events. A serving process calls
//! [`init_tracing`] once at startup and keeps the returned guard alive so
//! buffered log lines are flushed on shutdown.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::CardioriskError;

/// `stdout` or `file`.
pub const LOG_MODE_ENV: &str = "CARDIORISK_LOG_MODE";

/// Log file path used in `file` mode.
pub const LOG_FILE_ENV: &str = "CARDIORISK_LOG_FILE";

const DEFAULT_LOG_FILE: &str = "cardiorisk.log";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub target: LogTarget,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Stdout,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Read logging configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read logging configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = match lookup(LOG_MODE_ENV).as_deref().map(str::trim) {
            Some("file") => LogTarget::File(
                lookup(LOG_FILE_ENV)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            ),
            _ => LogTarget::Stdout,
        };
        Self {
            target,
            ..Self::default()
        }
    }
}

fn open_log_file(path: &Path) -> crate::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        // Best-effort: opening the file reports the real error.
        let _ = std::fs::create_dir_all(parent);
    }
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}

/// Install the global `tracing` subscriber.
///
/// # Errors
/// Returns `Io` if the log file cannot be opened and `Config` if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> crate::Result<WorkerGuard> {
    let (writer, guard) = match &config.target {
        LogTarget::File(path) => tracing_appender::non_blocking(open_log_file(path)?),
        LogTarget::Stdout => tracing_appender::non_blocking(std::io::stdout()),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .try_init()
        .map_err(|e| CardioriskError::Config(format!("Failed to install subscriber: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stdout() {
        let cfg = LogConfig::from_lookup(|_| None);
        assert_eq!(cfg, LogConfig::default());
        assert_eq!(cfg.default_filter, "info");
    }

    #[test]
    fn test_file_mode() {
        let cfg = LogConfig::from_lookup(|name| match name {
            LOG_MODE_ENV => Some("file".into()),
            LOG_FILE_ENV => Some("/var/log/cardiorisk/predictor.log".into()),
            _ => None,
        });
        assert_eq!(
            cfg.target,
            LogTarget::File(PathBuf::from("/var/log/cardiorisk/predictor.log"))
        );

        let cfg = LogConfig::from_lookup(|name| (name == LOG_MODE_ENV).then(|| "file".to_string()));
        assert_eq!(cfg.target, LogTarget::File(PathBuf::from(DEFAULT_LOG_FILE)));
    }

    #[test]
    fn test_from_env() {
        // Only this test touches the logging variables.
        std::env::set_var(LOG_MODE_ENV, "file");
        std::env::set_var(LOG_FILE_ENV, "logs/cardiorisk-test.log");
        let cfg = LogConfig::from_env();
        std::env::remove_var(LOG_MODE_ENV);
        std::env::remove_var(LOG_FILE_ENV);

        assert_eq!(cfg.target, LogTarget::File(PathBuf::from("logs/cardiorisk-test.log")));
    }

    #[test]
    fn test_init_tracing_installs_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = LogConfig {
            target: LogTarget::File(temp.path().join("predictor.log")),
            default_filter: "info".to_string(),
        };

        let guard = init_tracing(&config).expect("first install succeeds");
        tracing::info!("subscriber installed");

        let err = init_tracing(&config).expect_err("second install must fail");
        assert!(matches!(err, CardioriskError::Config(_)));
        drop(guard);
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("predictor.log");
        open_log_file(&path).expect("Should create");
        assert!(path.exists());
    }
}
