//! Tests for TOML config loading and file reference resolution.

use super::*;
use crate::schema::{DispatchMode, Size};
use dry_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_dry_window.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window.toml");
    std::fs::write(
        &path,
        r#"
title = "Calculator"
size = [640, 480]
min_size = [320, 240]

[bridge]
dispatch = "worker"
call_timeout_ms = 2000
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.title, "Calculator");
    assert_eq!(config.size, Size::new(640, 480));
    assert_eq!(config.min_size, Size::new(320, 240));
    assert_eq!(config.bridge.dispatch, DispatchMode::Worker);
    assert_eq!(config.bridge.call_timeout_ms, Some(2000));
    // Defaults preserved
    assert_eq!(config.content.markup(), Some("<h1>Hello World</h1>"));
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn content_file_is_resolved_relative_to_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("ui")).unwrap();
    std::fs::write(dir.path().join("ui/index.html"), "<main>app</main>").unwrap();
    std::fs::write(dir.path().join("ui/boot.js"), "window.booted = true;").unwrap();
    let path = dir.path().join("window.toml");
    std::fs::write(
        &path,
        "content_file = \"ui/index.html\"\nstartup_script_file = \"ui/boot.js\"\n",
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.content.markup(), Some("<main>app</main>"));
    assert_eq!(config.startup_script.as_deref(), Some("window.booted = true;"));
}

#[test]
fn missing_content_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window.toml");
    std::fs::write(&path, "content_file = \"nope.html\"\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(p) if p.ends_with("nope.html")));
}

#[test]
fn url_content_is_rejected_at_load() {
    let err = load_from_str("content = \"https://www.example.com\"", Path::new("/tmp/w.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedContent(_)));
}

#[test]
fn invalid_dimensions_are_rejected_at_load() {
    let err = load_from_str("size = [0, 600]", Path::new("/tmp/w.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn default_config_path_ends_with_window_toml() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("dry/window.toml"));
    }
}
