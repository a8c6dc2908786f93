//! Window configuration types.

use dry_common::ConfigError;
use serde::{Deserialize, Serialize};

use super::bridge::BridgeConfig;
use super::content::Content;

/// Width and height in logical pixels. Written as `[width, height]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both dimensions fit inside `other`.
    pub fn fits_within(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Size> for (u32, u32) {
    fn from(size: Size) -> Self {
        (size.width, size.height)
    }
}

/// Everything needed to open one webview window, except the registered
/// functions (those are attached on the host side).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub min_size: Size,
    pub size: Size,
    pub content: Content,
    /// Extra script injected after the bridge proxy, before page scripts.
    pub startup_script: Option<String>,
    /// Enable the renderer's developer tools.
    pub devtools: bool,
    pub bridge: BridgeConfig,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Webview Window".into(),
            min_size: Size::new(1152, 720),
            size: Size::new(1280, 800),
            content: Content::default(),
            startup_script: None,
            devtools: false,
            bridge: BridgeConfig::default(),
        }
    }
}

impl WindowConfig {
    pub fn builder() -> WindowConfigBuilder {
        WindowConfigBuilder::default()
    }
}

/// Builds a validated [`WindowConfig`].
#[derive(Debug, Clone, Default)]
pub struct WindowConfigBuilder {
    config: WindowConfig,
}

impl WindowConfigBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.config.size = Size::new(width, height);
        self
    }

    pub fn min_size(mut self, width: u32, height: u32) -> Self {
        self.config.min_size = Size::new(width, height);
        self
    }

    /// Markup to render. URL-like strings are rejected by [`build`](Self::build).
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.config.content = Content::classify(content);
        self
    }

    pub fn startup_script(mut self, script: impl Into<String>) -> Self {
        self.config.startup_script = Some(script.into());
        self
    }

    pub fn devtools(mut self, enabled: bool) -> Self {
        self.config.devtools = enabled;
        self
    }

    pub fn bridge(mut self, bridge: BridgeConfig) -> Self {
        self.config.bridge = bridge;
        self
    }

    pub fn build(self) -> Result<WindowConfig, ConfigError> {
        crate::validation::validate(&self.config)?;
        Ok(self.config)
    }
}

// =============================================================================
// Tests
// =============================================================================
