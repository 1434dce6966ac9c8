//! Config file loading.

use crate::schema::RenderConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "BLOCKFORGE_CONFIG_DIR";

/// Resolve the blockforge config directory.
/// Priority: `BLOCKFORGE_CONFIG_DIR` env > `~/.blockforge/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".blockforge"),
        None => PathBuf::from(".blockforge"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk, as JSON for `.json` files and YAML
/// otherwise.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(RenderConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(RenderConfig::default());
    }

    let config: RenderConfig = if is_json(path) {
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config JSON at: {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?
    };

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn loads_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "layout:\n  fallbackWidth: 30.5\nlogging:\n  level: debug").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.layout.unwrap().fallback_width, Some(30.5));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn loads_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"logging":{{"json":true,"dir":"/var/log/blockforge"}}}}"#).unwrap();
        let logging = load_config(file.path()).unwrap().logging.unwrap();
        assert_eq!(logging.json, Some(true));
        assert_eq!(logging.dir, Some(PathBuf::from("/var/log/blockforge")));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert_eq!(load_config(file.path()).unwrap(), RenderConfig::default());
    }

    #[test]
    fn malformed_file_names_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn config_file_lives_in_dir() {
        assert_eq!(
            config_file_path(Path::new("/etc/blockforge")),
            PathBuf::from("/etc/blockforge/config.yaml")
        );
    }
}
