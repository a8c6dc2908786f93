//! Webview window host with a bidirectional RPC bridge.
//!
//! Wraps `winit` and `wry` to provide:
//! - A single window whose client area is one webview
//! - Named host functions callable from script as `window.api.<name>(...)`
//! - Host-initiated pushes to `window.dry.onMessage` listeners
//! - Inline or worker-pool dispatch of calls

pub mod bridge;
pub mod codec;
pub mod dispatcher;
pub mod events;
pub mod host;
pub mod ipc;

pub use bridge::{Bridge, HostState, ScriptSink};
pub use codec::Value;
pub use dispatcher::{Api, Callable, CallableError};
pub use events::{EventSink, HostEvent, PageLoadState};
pub use host::{MessageSender, Webview};
pub use ipc::{CallEnvelope, PushEnvelope, ResultEnvelope};
