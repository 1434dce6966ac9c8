//! Config defaults: applies default values to parsed config.

use crate::schema::{LayoutConfig, LoggingConfig, RenderConfig};
use blockforge_layout::DEFAULT_WIDTH;

/// Default log filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: RenderConfig) -> RenderConfig {
    let config = apply_layout_defaults(config);
    apply_logging_defaults(config)
}

/// Untabulated characters measure as an ordinary space unless overridden.
fn apply_layout_defaults(mut config: RenderConfig) -> RenderConfig {
    let layout = config.layout.get_or_insert_with(LayoutConfig::default);
    if layout.fallback_width.is_none() {
        layout.fallback_width = Some(DEFAULT_WIDTH);
    }
    config
}

fn apply_logging_defaults(mut config: RenderConfig) -> RenderConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn fills_missing_sections() {
        let config = apply_all_defaults(RenderConfig::default());
        let layout = config.layout.unwrap();
        assert_eq!(layout.fallback_width, Some(DEFAULT_WIDTH));
        assert!(layout.metrics_path.is_none());
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("info"));
        assert_eq!(logging.json, Some(false));
    }

    #[test]
    fn keeps_explicit_values() {
        let config = RenderConfig {
            layout: Some(LayoutConfig {
                metrics_path: Some(PathBuf::from("m.json")),
                fallback_width: Some(30.0),
            }),
            logging: Some(LoggingConfig {
                level: Some("debug".into()),
                json: Some(true),
                dir: None,
            }),
        };
        assert_eq!(apply_all_defaults(config.clone()), config);
    }
}
