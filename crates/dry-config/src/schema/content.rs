//! Initial page content for the window.

use std::fmt;
use std::sync::LazyLock;

use dry_common::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

static REMOTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[a-z0-9.-]+").unwrap());

/// What the renderer shows when the window opens.
///
/// Strings starting with `http(s)://` and a lowercase host are `Remote`.
/// Remote loading is not implemented: the variant exists so such strings
/// are recognised and rejected instead of being rendered as markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Content {
    Inline(String),
    Remote(String),
}

impl Content {
    /// Classify a string without rejecting anything.
    pub fn classify(source: impl Into<String>) -> Self {
        let source = source.into();
        if REMOTE_URL_RE.is_match(&source) {
            Self::Remote(source)
        } else {
            Self::Inline(source)
        }
    }

    /// Build inline content, failing fast on URL-like input.
    pub fn new(source: impl Into<String>) -> Result<Self, ConfigError> {
        Self::classify(source).ensure_supported()
    }

    /// Remote content is a future capability; this always fails.
    pub fn remote(url: impl Into<String>) -> Result<Self, ConfigError> {
        Err(ConfigError::UnsupportedContent(url.into()))
    }

    pub fn ensure_supported(self) -> Result<Self, ConfigError> {
        match self {
            Self::Inline(_) => Ok(self),
            Self::Remote(url) => Err(ConfigError::UnsupportedContent(url)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Inline markup, if this is inline content.
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Inline(html) => Some(html),
            Self::Remote(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline(s) | Self::Remote(s) => s,
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Inline("<h1>Hello World</h1>".into())
    }
}

impl From<String> for Content {
    fn from(source: String) -> Self {
        Self::classify(source)
    }
}

impl From<Content> for String {
    fn from(content: Content) -> Self {
        match content {
            Content::Inline(s) | Content::Remote(s) => s,
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
