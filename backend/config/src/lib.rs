//! `blockforge-config` — render configuration management.
//!
//! Provides:
//! - Typed config schema (layout metrics, logging)
//! - YAML/JSON loading
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation report

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, CONFIG_DIR_ENV};
pub use schema::{LayoutConfig, LoggingConfig, RenderConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use blockforge_layout::{FontMetrics, LayoutEngine};
use logging::LoggerOptions;
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, apply defaults to, and validate a config file.
///
/// Warnings are logged; errors are logged and fail the load.
pub fn load_and_prepare(path: &Path) -> Result<RenderConfig> {
    let raw_config = load_config(path)?;

    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: RenderConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{first} ({} error(s) in {})", report.errors.len(), path.display());
    }

    Ok(config)
}

/// Build a layout engine from the `layout` section: custom metrics file or
/// the bundled table, and the configured fallback width.
pub fn engine_from_config(config: &RenderConfig) -> Result<LayoutEngine> {
    let layout = config.layout.clone().unwrap_or_default();
    let metrics = match &layout.metrics_path {
        Some(path) => FontMetrics::load(path)?,
        None => FontMetrics::bundled()?,
    };
    let engine = LayoutEngine::new(metrics);
    Ok(match layout.fallback_width {
        Some(width) => engine.with_fallback_width(width),
        None => engine,
    })
}

/// Subscriber options from the `logging` section.
pub fn logger_options(config: &RenderConfig) -> LoggerOptions {
    let defaults = LoggerOptions::default();
    let Some(logging) = &config.logging else {
        return defaults;
    };
    LoggerOptions {
        level: logging.level.clone().unwrap_or(defaults.level),
        json: logging.json.unwrap_or(defaults.json),
        dir: logging.dir.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn prepare_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_and_prepare(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(
            config.layout.unwrap().fallback_width,
            Some(blockforge_layout::DEFAULT_WIDTH)
        );
    }

    #[test]
    fn prepare_fails_on_validation_errors() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "layout:\n  fallbackWidth: -1").unwrap();
        let err = load_and_prepare(file.path()).unwrap_err();
        assert!(err.to_string().contains("layout.fallbackWidth"));
    }

    #[test]
    fn engine_uses_custom_metrics_and_fallback() {
        let mut metrics = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            metrics,
            r#"{{"letters":{{"a":10}},"spaces":{{"\u2003":100,"\u200a":10}}}}"#
        )
        .unwrap();
        let config = RenderConfig {
            layout: Some(LayoutConfig {
                metrics_path: Some(metrics.path().to_path_buf()),
                fallback_width: Some(40.0),
            }),
            ..Default::default()
        };
        let engine = engine_from_config(&config).unwrap();
        assert_eq!(engine.measure_width("ab"), 50.0);
        assert_eq!(engine.make_indent(120.0), "\u{2003}\u{200a}\u{200a}");
    }

    #[test]
    fn engine_defaults_to_bundled_metrics() {
        let engine = engine_from_config(&RenderConfig::default()).unwrap();
        assert_eq!(engine.fallback_width(), blockforge_layout::DEFAULT_WIDTH);
        assert_eq!(engine.make_indent(100.0), "\u{2003}");
    }

    #[test]
    fn logger_options_follow_config() {
        let config = apply_all_defaults(RenderConfig {
            logging: Some(LoggingConfig {
                json: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
        let options = logger_options(&config);
        assert_eq!(options.level, "info");
        assert!(options.json);
        assert!(options.dir.is_none());
    }
}
