//! Thread-safe handle for pushing messages into a running window.

use std::fmt;
use std::sync::{Arc, Mutex};

use dry_common::TransportError;
use tracing::debug;

use crate::codec::Value;
use crate::events::{EventSink, HostEvent};
use crate::ipc::PushEnvelope;

/// Pushes host-initiated messages to the renderer.
///
/// Obtained from [`Webview::message_sender`](super::Webview::message_sender)
/// before `run()`. It can be cloned and moved to other threads. Messages
/// are only accepted while the window is running. Earlier or later sends
/// fail with [`TransportError::NotRunning`].
#[derive(Clone, Default)]
pub struct MessageSender {
    sink: Arc<Mutex<Option<Arc<dyn EventSink>>>>,
}

impl MessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `value` to every script-side listener.
    ///
    /// The value is encoded on the calling thread, so an unencodable value
    /// fails here and not inside the event loop.
    pub fn send_message(&self, value: impl Into<Value>) -> Result<(), TransportError> {
        let sink = self.current()?;
        let push = PushEnvelope::new(&value.into())?;
        sink.send_event(HostEvent::Push(push))
    }

    /// Ask the window to close.
    pub fn close(&self) -> Result<(), TransportError> {
        self.current()?.send_event(HostEvent::Close)
    }

    pub fn is_running(&self) -> bool {
        self.sink.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub(crate) fn attach(&self, sink: Arc<dyn EventSink>) {
        if let Ok(mut slot) = self.sink.lock() {
            *slot = Some(sink);
            debug!("message sender attached");
        }
    }

    pub(crate) fn detach(&self) {
        if let Ok(mut slot) = self.sink.lock() {
            if slot.take().is_some() {
                debug!("message sender detached");
            }
        }
    }

    fn current(&self) -> Result<Arc<dyn EventSink>, TransportError> {
        self.sink
            .lock()
            .map_err(|_| TransportError::EventLoop("message sender lock poisoned".into()))?
            .clone()
            .ok_or(TransportError::NotRunning)
    }
}

impl fmt::Debug for MessageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSender")
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dry_common::EncodeError;
    use serde_json::json;
    use std::sync::mpsc;

    fn attached() -> (MessageSender, mpsc::Receiver<HostEvent>) {
        let (tx, rx) = mpsc::channel();
        let sender = MessageSender::new();
        sender.attach(Arc::new(Mutex::new(tx)));
        (sender, rx)
    }

    #[test]
    fn send_before_attach_is_not_running() {
        let sender = MessageSender::new();
        assert!(!sender.is_running());
        assert!(matches!(
            sender.send_message("hi"),
            Err(TransportError::NotRunning)
        ));
        assert!(matches!(sender.close(), Err(TransportError::NotRunning)));
    }

    #[test]
    fn send_enqueues_push_event() {
        let (sender, rx) = attached();
        let payload: Value = [("text", "hi")].into_iter().collect();
        sender.send_message(payload).unwrap();

        match rx.try_recv().unwrap() {
            HostEvent::Push(push) => assert_eq!(push.payload, json!({"text": "hi"})),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn clones_share_the_same_window() {
        let (sender, rx) = attached();
        let clone = sender.clone();

        std::thread::spawn(move || clone.send_message(1).unwrap())
            .join()
            .unwrap();
        sender.send_message(2).unwrap();

        let payloads: Vec<_> = rx
            .try_iter()
            .map(|event| match event {
                HostEvent::Push(push) => push.payload,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(payloads, vec![json!(1), json!(2)]);
    }

    #[test]
    fn unencodable_value_fails_synchronously() {
        let (sender, rx) = attached();
        let err = sender.send_message(f64::NAN).unwrap_err();
        assert!(matches!(err, TransportError::Encode(EncodeError::NonFiniteFloat(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn detach_stops_delivery() {
        let (sender, rx) = attached();
        sender.detach();
        assert!(matches!(
            sender.send_message("late"),
            Err(TransportError::NotRunning)
        ));
        assert!(rx.try_recv().is_err());
        // Idempotent.
        sender.detach();
    }

    #[test]
    fn close_enqueues_close_event() {
        let (sender, rx) = attached();
        sender.close().unwrap();
        assert_eq!(rx.try_recv().unwrap(), HostEvent::Close);
    }

    #[test]
    fn debug_shows_running_state() {
        let (sender, _rx) = attached();
        assert_eq!(format!("{sender:?}"), "MessageSender { running: true }");
    }
}
