//! Config validation with user-friendly error messages.

use crate::schema::RenderConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &RenderConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_layout(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_layout(config: &RenderConfig, report: &mut ValidationReport) {
    let Some(layout) = &config.layout else { return };
    if let Some(width) = layout.fallback_width {
        if !width.is_finite() || width <= 0.0 {
            report.error("layout.fallbackWidth", "fallbackWidth must be a positive number");
        }
    }
    if let Some(path) = &layout.metrics_path {
        if !path.exists() {
            report.error(
                "layout.metricsPath",
                format!("Metrics file not found: {}", path.display()),
            );
        } else if path.extension().and_then(|e| e.to_str()) != Some("json") {
            report.warn("layout.metricsPath", "Metrics file is expected to be JSON");
        }
    }
}

fn validate_logging(config: &RenderConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        // Plain levels are checked; full filter directives are left to the subscriber.
        if !level.contains(['=', ',']) && !is_known_level(level) {
            report.warn("logging.level", format!("Unknown log level '{level}'"));
        }
    }
    if let Some(dir) = &logging.dir {
        if dir.is_file() {
            report.error("logging.dir", "Log directory path points to a file");
        }
    }
}

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

fn is_known_level(level: &str) -> bool {
    LEVELS.contains(&level.trim().to_ascii_lowercase().as_str())
}
