//! Events delivered to the window's event loop.

use dry_common::TransportError;
use serde::{Deserialize, Serialize};

use crate::ipc::{PushEnvelope, ResultEnvelope};

/// State of a page load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLoadState {
    /// Navigation has started.
    Started,
    /// Page has fully loaded (DOMContentLoaded + resources).
    Finished,
}

impl From<wry::PageLoadEvent> for PageLoadState {
    fn from(e: wry::PageLoadEvent) -> Self {
        match e {
            wry::PageLoadEvent::Started => Self::Started,
            wry::PageLoadEvent::Finished => Self::Finished,
        }
    }
}

/// User events carried by the window's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Raw IPC body posted by script.
    Ipc(String),
    /// A worker finished a call.
    CallCompleted(ResultEnvelope),
    /// The embedding application queued a push.
    Push(PushEnvelope),
    /// The embedding application asked the window to close.
    Close,
    /// Page load state changed. Carries the URL.
    PageLoad { state: PageLoadState, url: String },
}

/// Somewhere to deliver [`HostEvent`]s from any thread.
///
/// The running window implements this over its event loop proxy; tests
/// implement it over a channel.
pub trait EventSink: Send + Sync {
    fn send_event(&self, event: HostEvent) -> Result<(), TransportError>;
}

impl EventSink for std::sync::Mutex<std::sync::mpsc::Sender<HostEvent>> {
    fn send_event(&self, event: HostEvent) -> Result<(), TransportError> {
        self.lock()
            .map_err(|_| TransportError::EventLoop("event sink lock poisoned".into()))?
            .send(event)
            .map_err(|_| TransportError::NotRunning)
    }
}

impl EventSink for std::sync::Mutex<winit::event_loop::EventLoopProxy<HostEvent>> {
    fn send_event(&self, event: HostEvent) -> Result<(), TransportError> {
        self.lock()
            .map_err(|_| TransportError::EventLoop("event sink lock poisoned".into()))?
            .send_event(event)
            .map_err(|_| TransportError::NotRunning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Mutex};

    #[test]
    fn page_load_state_from_wry() {
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Started),
            PageLoadState::Started
        );
        assert_eq!(
            PageLoadState::from(wry::PageLoadEvent::Finished),
            PageLoadState::Finished
        );
    }

    #[test]
    fn channel_sink_delivers_in_order() {
        let (tx, rx) = mpsc::channel();
        let sink = Mutex::new(tx);
        sink.send_event(HostEvent::Ipc("a".into())).unwrap();
        sink.send_event(HostEvent::Close).unwrap();
        assert_eq!(rx.recv().unwrap(), HostEvent::Ipc("a".into()));
        assert_eq!(rx.recv().unwrap(), HostEvent::Close);
    }

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = Mutex::new(tx);
        assert!(matches!(
            sink.send_event(HostEvent::Close),
            Err(TransportError::NotRunning)
        ));
    }
}
