//! Logging setup for the appdock host.
//!
//! Console and rolling-file output driven by the `[logging]` configuration
//! section. The returned guard must be held for the lifetime of the
//! process, otherwise buffered file output is lost.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "appdock.log";

/// Resolved logging settings
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log to stderr
    pub console_enabled: bool,
    /// Log to a rolling file
    pub file_enabled: bool,
    /// Directory for file logs
    pub log_dir: PathBuf,
    /// File rotation policy
    pub rotation: LogRotation,
}

#[derive(Debug, Clone)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
            file_enabled: false,
            log_dir: PathBuf::from("logs"),
            rotation: LogRotation::Daily,
        }
    }
}

impl LogConfig {
    /// Derive logging settings from the host configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            console_enabled: config.console,
            file_enabled: config.file,
            log_dir: PathBuf::from(&config.dir),
            rotation: LogRotation::Daily,
        }
    }

    /// Override the configured level, e.g. from a CLI flag.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns the appender guard when file output is enabled.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match (config.console_enabled, config.file_enabled) {
        (true, true) => {
            let (writer, guard) = file_writer(config)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr.and(writer))
                .with_target(true)
                .init();
            Ok(Some(guard))
        }
        (true, false) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
            Ok(None)
        }
        (false, true) => {
            let (writer, guard) = file_writer(config)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .init();
            Ok(Some(guard))
        }
        (false, false) => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .init();
            Ok(None)
        }
    }
}

fn file_writer(
    config: &LogConfig,
) -> Result<(non_blocking::NonBlocking, WorkerGuard)> {
    ensure_log_dir(&config.log_dir)?;
    let appender = match config.rotation {
        LogRotation::Daily => rolling::daily(&config.log_dir, LOG_FILE_NAME),
        LogRotation::Hourly => rolling::hourly(&config.log_dir, LOG_FILE_NAME),
        LogRotation::Never => rolling::never(&config.log_dir, LOG_FILE_NAME),
    };
    Ok(non_blocking(appender))
}

fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
