//! The window host: owns config, API and sender until `run()` hands them
//! to the event loop.

mod app;
mod sender;

use std::sync::{Arc, Mutex};

use dry_common::{ConfigError, DryError, SessionId, TransportError};
use dry_config::WindowConfig;
use tracing::info;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::bridge::Bridge;
use crate::codec::Value;
use crate::dispatcher::{Api, CallableError};
use crate::events::{EventSink, HostEvent};

use app::HostApp;
pub use sender::MessageSender;

/// A window with an embedded webview and a script-callable API.
///
/// ```no_run
/// use dry_config::WindowConfig;
/// use dry_webview::{Value, Webview};
///
/// let mut webview = Webview::new(WindowConfig::default()).unwrap();
/// webview.register("add", |args| {
///     Ok(Value::Int(args.iter().filter_map(Value::as_i64).sum()))
/// });
/// webview.run().unwrap();
/// ```
#[derive(Debug)]
pub struct Webview {
    config: WindowConfig,
    api: Api,
    sender: MessageSender,
    session: SessionId,
}

impl Webview {
    /// Validate `config` and create an unstarted host.
    pub fn new(config: WindowConfig) -> Result<Self, ConfigError> {
        dry_config::validate(&config)?;
        Ok(Self {
            config,
            api: Api::new(),
            sender: MessageSender::new(),
            session: SessionId::new(),
        })
    }

    /// Expose `f` to script as `window.api.<name>`.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        self.api.register(name, f);
        self
    }

    /// Replace the whole API.
    pub fn with_api(mut self, api: Api) -> Self {
        self.api = api;
        self
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// A handle for pushing messages once the window is running.
    pub fn message_sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Open the window and block until it closes.
    ///
    /// Must be called on the main thread. Returns the first transport
    /// failure if the window had to close because of one.
    pub fn run(self) -> Result<(), DryError> {
        let Webview {
            mut config,
            api,
            sender,
            session,
        } = self;
        config.content = config.content.ensure_supported()?;

        let event_loop = EventLoop::<HostEvent>::with_user_event()
            .build()
            .map_err(|e| TransportError::EventLoop(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let events: Arc<dyn EventSink> = Arc::new(Mutex::new(event_loop.create_proxy()));
        let bridge = Bridge::new(api, &config.bridge, Arc::clone(&events), session.clone())?;

        info!(
            session = session.short(),
            title = %config.title,
            mode = ?bridge.dispatch_mode(),
            "starting window host"
        );

        let mut app = HostApp::new(config, bridge, sender, events);
        event_loop
            .run_app(&mut app)
            .map_err(|e| TransportError::EventLoop(e.to_string()))?;

        info!(session = session.short(), "window host stopped");
        app.into_result().map_err(DryError::from)
    }
}
