//! Off-loop execution of calls on a tokio blocking pool.

use std::sync::Arc;
use std::time::Duration;

use dry_common::{DispatchError, TransportError};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::dispatcher::Api;
use crate::events::{EventSink, HostEvent};
use crate::ipc::{CallEnvelope, ResultEnvelope};

/// How long shutdown waits for running functions before abandoning them.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Runs calls on blocking threads and reports each result back to the
/// event loop as a [`HostEvent::CallCompleted`] carrying the call's own id.
pub(super) struct WorkerPool {
    runtime: Runtime,
    events: Arc<dyn EventSink>,
    timeout: Option<Duration>,
}

impl WorkerPool {
    pub(super) fn new(
        threads: usize,
        timeout: Option<Duration>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads.max(1))
            .thread_name("dry-worker")
            .enable_time()
            .build()
            .map_err(|e| TransportError::EventLoop(format!("failed to start worker pool: {e}")))?;

        Ok(Self {
            runtime,
            events,
            timeout,
        })
    }

    pub(super) fn submit(&self, api: Arc<Api>, call: CallEnvelope) {
        let events = Arc::clone(&self.events);
        let timeout = self.timeout;

        self.runtime.spawn(async move {
            let CallEnvelope {
                id,
                function_name,
                arguments,
            } = call;
            let name = function_name.clone();
            let task = tokio::task::spawn_blocking(move || api.dispatch(&function_name, arguments));

            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // The function keeps running; its result is discarded.
                        warn!(call_id = %id, function = %name, ?limit, "call timed out");
                        Ok(Err(DispatchError::Timeout))
                    }
                },
                None => task.await,
            };

            let outcome = joined.unwrap_or_else(|e| {
                Err(DispatchError::CallableFailure(format!("worker task failed: {e}")))
            });

            let result = ResultEnvelope::from_dispatch(id, outcome);
            if let Err(e) = events.send_event(HostEvent::CallCompleted(result)) {
                debug!(function = %name, error = %e, "completion dropped: event loop gone");
            }
        });
    }

    pub(super) fn shutdown(self) {
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }
}
