//! Application logging functionality
//!
//! Logs always go to stderr so stdout carries nothing but the report.
//! Optionally they are also written to a daily file under the config directory.

use crate::core::config_file::ConfigFile;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Keeps the file writer alive; dropping it flushes pending lines.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    ConfigFile::config_dir().join("logs")
}

/// Name of today's log file
pub fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d");
    format!("notodiff-{}.log", timestamp)
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    logs_dir().join(log_file_name())
}

/// Initialize the logs directory
pub fn initialize_logs_directory() -> anyhow::Result<PathBuf> {
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir)?;
    Ok(logs_dir)
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "notodiff=debug,info"
    } else {
        "info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let directive = default_directive(verbose);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Install the global subscriber.
pub fn init(verbose: bool, log_to_file: bool) -> anyhow::Result<LogGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !log_to_file {
        tracing_subscriber::registry()
            .with(env_filter(verbose))
            .with(stderr_layer)
            .try_init()?;
        return Ok(LogGuard { _file: None });
    }

    let logs_dir = initialize_logs_directory()?;
    let appender = tracing_appender::rolling::never(logs_dir, log_file_name());
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("Logging to {}", current_log_file().display());
    Ok(LogGuard { _file: Some(guard) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        let name = log_file_name();
        assert!(name.starts_with("notodiff-"));
        assert!(name.ends_with(".log"));
        // notodiff-YYYY-MM-DD.log
        assert_eq!(name.len(), "notodiff-".len() + 10 + ".log".len());
    }

    #[test]
    fn test_logs_live_under_config_dir() {
        assert!(current_log_file().starts_with(ConfigFile::config_dir()));
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert!(default_directive(true).contains("notodiff=debug"));
    }
}
