//! Structured Logger
//!
//! Wraps `tracing` to provide console output (human or JSON), optional file
//! rotation (NDJSON), and environment-based level control.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of rolled log files (`blockforge.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "blockforge.log";

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit console lines as JSON objects.
    pub json: bool,
    /// Directory for daily-rolled NDJSON files; no file output when `None`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            dir: None,
        }
    }
}

/// Initialize the global structured logger.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_logger(options: &LoggerOptions) -> Result<bool> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .with_context(|| format!("Invalid log level directive: {}", options.level))?;

    let file_layer = match &options.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    let json_console = options
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain_console = (!options.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(plain_console)
        .with(file_layer)
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_level() {
        // Only meaningful when RUST_LOG does not take precedence.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let options = LoggerOptions {
            level: "blockforge=verbose".into(),
            ..LoggerOptions::default()
        };
        assert!(init_logger(&options).is_err());
    }

    #[test]
    fn creates_log_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let options = LoggerOptions {
            dir: Some(dir.clone()),
            ..LoggerOptions::default()
        };
        init_logger(&options).unwrap();
        assert!(dir.is_dir());
    }
}
