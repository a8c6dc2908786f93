//! Core TOML config loading: read from path or platform default.

use crate::schema::{Content, WindowConfig};
use crate::validation;
use dry_common::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, resolve_relative};

/// On-disk shape: a `WindowConfig` plus file references that are inlined
/// at load time.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    window: WindowConfig,
    content_file: Option<PathBuf>,
    startup_script_file: Option<PathBuf>,
}

/// Parse and validate a config from TOML text. File references are
/// resolved against `base`.
pub fn load_from_str(toml_str: &str, base: &Path) -> Result<WindowConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(toml_str)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    let mut config = file.window;

    if let Some(rel) = file.content_file {
        let path = resolve_relative(base, &rel);
        let markup = read_referenced(&path)?;
        config.content = Content::classify(markup);
    }

    if let Some(rel) = file.startup_script_file {
        let path = resolve_relative(base, &rel);
        config.startup_script = Some(read_referenced(&path)?);
    }

    validation::validate(&config)?;
    Ok(config)
}

/// Load config from a specific TOML file path.
///
/// Missing fields take their defaults. Unlike a partial config, an invalid
/// one is rejected: the window must never open with bad dimensions or
/// remote content.
pub fn load_from_path(path: &Path) -> Result<WindowConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config = load_from_str(&content, path)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/dry/window.toml`
/// On Linux: `~/.config/dry/window.toml`
///
/// If the file does not exist, returns defaults.
pub fn load_default() -> Result<WindowConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, using defaults", path.display());
            Ok(WindowConfig::default())
        }
        Err(e) => Err(e),
    }
}

fn read_referenced(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("failed to read {}: {e}", path.display())),
    })
}
