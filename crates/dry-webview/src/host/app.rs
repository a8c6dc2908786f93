//! `ApplicationHandler` driving one window and its webview.

use std::sync::Arc;

use dry_common::TransportError;
use dry_config::WindowConfig;
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};
use wry::WebViewBuilder;

use crate::bridge::{Bridge, HostState};
use crate::events::{EventSink, HostEvent, PageLoadState};

use super::MessageSender;

pub(super) struct HostApp {
    config: WindowConfig,
    bridge: Bridge,
    sender: MessageSender,
    events: Arc<dyn EventSink>,
    // Declared before `window` so it drops first.
    webview: Option<wry::WebView>,
    window: Option<Window>,
    error: Option<TransportError>,
}

impl HostApp {
    pub(super) fn new(
        config: WindowConfig,
        bridge: Bridge,
        sender: MessageSender,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            bridge,
            sender,
            events,
            webview: None,
            window: None,
            error: None,
        }
    }

    /// The first transport failure seen by the loop, if any.
    pub(super) fn into_result(mut self) -> Result<(), TransportError> {
        self.error.take().map_or(Ok(()), Err)
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), TransportError> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.size.width,
                self.config.size.height,
            ))
            .with_min_inner_size(LogicalSize::new(
                self.config.min_size.width,
                self.config.min_size.height,
            ));

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| TransportError::Window(e.to_string()))?;
        let webview = self.build_webview(&window)?;

        self.webview = Some(webview);
        self.window = Some(window);

        self.bridge.start();
        self.sender.attach(Arc::clone(&self.events));
        info!(title = %self.config.title, "window opened");
        Ok(())
    }

    fn build_webview(&self, window: &Window) -> Result<wry::WebView, TransportError> {
        let mut builder = WebViewBuilder::new()
            .with_bounds(fill_bounds(window.inner_size(), window.scale_factor()))
            .with_devtools(self.config.devtools)
            .with_initialization_script(&self.bridge.startup_script());

        // Runs after the bridge, so it can use `window.api` but not replace it.
        if let Some(script) = &self.config.startup_script {
            builder = builder.with_initialization_script(script);
        }

        let events = Arc::clone(&self.events);
        builder = builder.with_ipc_handler(move |request| {
            let body = request.body().to_string();
            debug!(body_len = body.len(), "IPC message from script");
            forward(events.as_ref(), HostEvent::Ipc(body));
        });

        let events = Arc::clone(&self.events);
        builder = builder.with_on_page_load_handler(move |event, url| {
            let state = PageLoadState::from(event);
            forward(events.as_ref(), HostEvent::PageLoad { state, url });
        });

        let html = self.config.content.markup().unwrap_or_default();
        builder
            .with_html(html)
            .build_as_child(window)
            .map_err(|e| TransportError::WebView(e.to_string()))
    }

    fn sync_bounds(&self, size: PhysicalSize<u32>) {
        let (Some(window), Some(webview)) = (&self.window, &self.webview) else {
            return;
        };
        if let Err(e) = webview.set_bounds(fill_bounds(size, window.scale_factor())) {
            warn!(error = %e, "failed to resize webview");
        }
    }

    /// Record `error`, then close. Only the first error is kept.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: TransportError) {
        error!(error = %error, "transport failure, closing window");
        self.error.get_or_insert(error);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if self.bridge.state() == HostState::Closed {
            event_loop.exit();
            return;
        }
        self.sender.detach();
        self.bridge.close();
        self.webview = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler<HostEvent> for HostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.bridge.state() != HostState::Unstarted {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!("window close requested");
                self.close(event_loop);
            }
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                self.sync_bounds(size);
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: HostEvent) {
        let outcome = match event {
            HostEvent::Close => {
                info!("close requested by host");
                self.close(event_loop);
                return;
            }
            HostEvent::PageLoad { state, url } => {
                debug!(?state, url = %url, "page load");
                return;
            }
            HostEvent::Ipc(body) => match &self.webview {
                Some(webview) => self.bridge.handle_ipc(&body, webview),
                None => Ok(()),
            },
            HostEvent::CallCompleted(result) => match &self.webview {
                Some(webview) => self.bridge.complete(result, webview),
                None => Ok(()),
            },
            HostEvent::Push(push) => match &self.webview {
                Some(webview) => self.bridge.push(&push, webview),
                None => Ok(()),
            },
        };

        if let Err(e) = outcome {
            self.fail(event_loop, e);
        }
    }
}

/// Hand a webview callback's event to the loop. Returns false, after
/// logging, if the loop is gone.
fn forward(events: &dyn EventSink, event: HostEvent) -> bool {
    let kind = match &event {
        HostEvent::Ipc(_) => "IPC message",
        HostEvent::PageLoad { .. } => "page load event",
        HostEvent::CallCompleted(_) => "call completion",
        HostEvent::Push(_) => "push",
        HostEvent::Close => "close request",
    };
    match events.send_event(event) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, kind, "event dropped");
            false
        }
    }
}

/// Bounds covering the whole client area of a window of `size`.
fn fill_bounds(size: PhysicalSize<u32>, scale_factor: f64) -> wry::Rect {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    wry::Rect {
        position: wry::dpi::Position::Logical(wry::dpi::LogicalPosition::new(0.0, 0.0)),
        size: wry::dpi::Size::Logical(wry::dpi::LogicalSize::new(
            logical.width,
            logical.height,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Mutex};

    #[test]
    fn forward_delivers_while_loop_is_alive() {
        let (tx, rx) = mpsc::channel();
        let events = Mutex::new(tx);
        let event = HostEvent::PageLoad {
            state: PageLoadState::Finished,
            url: "about:blank".into(),
        };
        assert!(forward(&events, event.clone()));
        assert_eq!(rx.try_recv().unwrap(), event);
    }

    #[test]
    fn forward_reports_dropped_events() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let events = Mutex::new(tx);
        assert!(!forward(
            &events,
            HostEvent::PageLoad {
                state: PageLoadState::Started,
                url: "about:blank".into(),
            }
        ));
        assert!(!forward(&events, HostEvent::Ipc("{}".into())));
    }

    #[test]
    fn fill_bounds_covers_window_in_logical_units() {
        let rect = fill_bounds(PhysicalSize::new(2560, 1600), 2.0);

        match rect.position {
            wry::dpi::Position::Logical(pos) => {
                assert_eq!((pos.x, pos.y), (0.0, 0.0));
            }
            _ => panic!("Expected logical position"),
        }
        match rect.size {
            wry::dpi::Size::Logical(size) => {
                assert!((size.width - 1280.0).abs() < f64::EPSILON);
                assert!((size.height - 800.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected logical size"),
        }
    }

    #[test]
    fn fill_bounds_at_unit_scale() {
        let rect = fill_bounds(PhysicalSize::new(1152, 720), 1.0);
        match rect.size {
            wry::dpi::Size::Logical(size) => {
                assert!((size.width - 1152.0).abs() < f64::EPSILON);
                assert!((size.height - 720.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected logical size"),
        }
    }
}
