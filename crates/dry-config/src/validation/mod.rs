//! Full configuration validation.
//!
//! Unsupported content is reported on its own since it is a hard stop, not
//! a range problem. Every other check pushes into a shared list that is
//! collected into a single `ConfigError`.

mod bridge;
mod helpers;
mod window;


use crate::schema::WindowConfig;
use dry_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &WindowConfig) -> Result<(), ConfigError> {
    if let crate::schema::Content::Remote(url) = &config.content {
        return Err(ConfigError::UnsupportedContent(url.clone()));
    }

    let mut errors: Vec<String> = Vec::new();

    window::validate_window(&mut errors, config);
    bridge::validate_bridge(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
