//! Background thread pushing a heartbeat message to the page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dry_common::TransportError;
use dry_webview::{MessageSender, Value};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The message pushed on tick `n`.
pub fn tick_message(n: u64) -> Value {
    Value::from_iter([
        ("text", Value::from("hi")),
        ("tick", Value::Int(n as i64)),
    ])
}

/// A running ticker thread.
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Push [`tick_message`] every `interval` until the window closes or
    /// [`stop`](Self::stop) is called.
    ///
    /// Ticks before the window is up are skipped. The thread exits once a
    /// send fails after at least one succeeded.
    pub fn spawn(sender: MessageSender, interval: Duration) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("dry-ticker".into())
            .spawn(move || run(&sender, interval, &flag))?;
        Ok(Self { stop, handle })
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.handle.join().is_err() {
            tracing::warn!("ticker thread panicked");
        }
    }
}

fn run(sender: &MessageSender, interval: Duration, stop: &AtomicBool) {
    let mut tick = 0u64;
    let mut delivered = false;
    loop {
        thread::sleep(interval);
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match sender.send_message(tick_message(tick)) {
            Ok(()) => {
                delivered = true;
                tick += 1;
            }
            Err(TransportError::NotRunning) if !delivered => continue,
            Err(e) => {
                tracing::debug!(error = %e, ticks = tick, "ticker stopped");
                break;
            }
        }
    }
}
