use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    /// Remote URLs are recognised but cannot be loaded yet.
    #[error("unsupported content: remote URL {0} cannot be loaded, only inline markup is supported")]
    UnsupportedContent(String),
}

/// A wire payload that could not be turned into a host value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("unsupported value: {0}")]
    Unsupported(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

/// A host value that has no wire representation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),
}

/// Per-call failure. The `Display` text is what the calling script sees as
/// the rejection message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("function not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    CallableFailure(String),

    #[error("function panicked: {0}")]
    Panicked(String),

    #[error("timeout")]
    Timeout,

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("duplicate call id: {0}")]
    DuplicateCall(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("event loop error: {0}")]
    EventLoop(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("webview error: {0}")]
    WebView(String),

    #[error("event loop not running")]
    NotRunning,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, thiserror::Error)]
pub enum DryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
