//! Config loading and command-line overrides.

use dry_common::{ConfigError, DryError};
use dry_config::{Content, DispatchMode, WindowConfig};

use crate::cli::Args;

/// Load the window config named on the command line, or the default one.
///
/// An explicit `--config` must load. The default location falls back to
/// built-in defaults when the file is missing or broken.
pub fn load(args: &Args) -> Result<WindowConfig, ConfigError> {
    match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using config override");
            dry_config::load_from_path(path)
        }
        None => Ok(dry_config::load_default().unwrap_or_else(|e| {
            tracing::warn!("Config load failed, using defaults: {e}");
            WindowConfig::default()
        })),
    }
}

/// Apply `--title`, `--html`, `--worker` and `--timeout-ms` on top of `config`.
pub fn apply(mut config: WindowConfig, args: &Args) -> Result<WindowConfig, DryError> {
    if let Some(title) = &args.title {
        config.title = title.clone();
    }

    if let Some(path) = &args.html {
        let markup = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DryError::Config(ConfigError::FileNotFound(path.clone())),
            _ => DryError::Io(e),
        })?;
        config.content = Content::new(markup)?;
    }

    if args.worker || args.timeout_ms.is_some() {
        config.bridge.dispatch = DispatchMode::Worker;
    }
    if let Some(ms) = args.timeout_ms {
        config.bridge.call_timeout_ms = Some(ms);
    }

    dry_config::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["dry"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn no_overrides_keeps_config() {
        let config = apply(WindowConfig::default(), &args(&[])).unwrap();
        assert_eq!(config.title, "Webview Window");
        assert_eq!(config.bridge.dispatch, DispatchMode::Inline);
    }

    #[test]
    fn title_and_worker_overrides() {
        let config = apply(WindowConfig::default(), &args(&["--title", "Demo", "--worker"])).unwrap();
        assert_eq!(config.title, "Demo");
        assert_eq!(config.bridge.dispatch, DispatchMode::Worker);
        assert!(config.bridge.call_timeout_ms.is_none());
    }

    #[test]
    fn timeout_implies_worker() {
        let config = apply(WindowConfig::default(), &args(&["--timeout-ms", "250"])).unwrap();
        assert_eq!(config.bridge.dispatch, DispatchMode::Worker);
        assert_eq!(config.bridge.call_timeout_ms, Some(250));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = apply(WindowConfig::default(), &args(&["--timeout-ms", "0"])).unwrap_err();
        assert!(matches!(err, DryError::Config(ConfigError::ValidationError(_))));
    }

    #[test]
    fn html_file_replaces_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>from file</p>").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = apply(WindowConfig::default(), &args(&["--html", &path])).unwrap();
        assert_eq!(config.content.markup(), Some("<p>from file</p>"));
    }

    #[test]
    fn missing_html_file_is_reported() {
        let err = apply(
            WindowConfig::default(),
            &args(&["--html", "/nonexistent/dry/page.html"]),
        )
        .unwrap_err();
        assert!(matches!(err, DryError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn explicit_config_must_exist() {
        let err = load(&args(&["--config", "/nonexistent/dry/window.toml"])).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.toml");
        std::fs::write(&path, "title = \"From File\"\n").unwrap();

        let config = load(&args(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(config.title, "From File");
    }
}
