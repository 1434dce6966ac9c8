//! Render configuration schema, typed for serde YAML/JSON deserialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for blockforge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Text layout (font metrics) settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Font metrics JSON replacing the bundled table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<PathBuf>,

    /// Width of characters missing from the metrics table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// JSON console output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Directory for rolling NDJSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}
