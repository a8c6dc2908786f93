//! Host side of the RPC bridge.
//!
//! `Bridge` owns the registered API and the window lifecycle state, turns
//! incoming IPC bodies into dispatches, and writes every result back to
//! the renderer through a [`ScriptSink`]. It never touches winit or wry
//! directly, so the whole protocol runs headless under test.

mod worker;


use std::collections::HashSet;
use std::sync::Arc;

use dry_common::{DispatchError, SessionId, TransportError};
use dry_config::{BridgeConfig, DispatchMode};
use tracing::{debug, info, warn};

use crate::dispatcher::Api;
use crate::events::EventSink;
use crate::ipc::{self, CallEnvelope, CallParseError, PushEnvelope, ResultEnvelope};

use worker::WorkerPool;

/// Lifecycle of a window host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Window not created yet.
    Unstarted,
    /// Window open; calls and pushes are serviced.
    Running,
    /// Window closed; nothing more is processed.
    Closed,
}

/// Something that can run script in the renderer.
pub trait ScriptSink {
    fn evaluate_script(&self, js: &str) -> Result<(), TransportError>;
}

impl ScriptSink for wry::WebView {
    fn evaluate_script(&self, js: &str) -> Result<(), TransportError> {
        wry::WebView::evaluate_script(self, js).map_err(|e| TransportError::WebView(e.to_string()))
    }
}

pub struct Bridge {
    api: Arc<Api>,
    state: HostState,
    mode: DispatchMode,
    worker: Option<WorkerPool>,
    /// Tokens handed to the worker pool and not yet answered.
    pending: HashSet<String>,
    session: SessionId,
}

impl Bridge {
    /// Create a bridge. Worker dispatch starts its thread pool here and
    /// reports completions through `events`.
    pub fn new(
        api: Api,
        config: &BridgeConfig,
        events: Arc<dyn EventSink>,
        session: SessionId,
    ) -> Result<Self, TransportError> {
        let worker = match config.dispatch {
            DispatchMode::Inline => None,
            DispatchMode::Worker => Some(WorkerPool::new(
                config.worker_threads,
                config.call_timeout(),
                events,
            )?),
        };

        Ok(Self {
            api: Arc::new(api),
            state: HostState::Unstarted,
            mode: config.dispatch,
            worker,
            pending: HashSet::new(),
            session,
        })
    }

    /// A bridge that dispatches on the calling thread.
    pub fn inline(api: Api) -> Self {
        Self {
            api: Arc::new(api),
            state: HostState::Unstarted,
            mode: DispatchMode::Inline,
            worker: None,
            pending: HashSet::new(),
            session: SessionId::new(),
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == HostState::Running
    }

    /// The configured mode. Unchanged by `close()`.
    pub fn dispatch_mode(&self) -> DispatchMode {
        self.mode
    }

    /// Calls handed to workers and not yet answered.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The bridge proxy script, listing the registered functions.
    pub fn startup_script(&self) -> String {
        ipc::bridge_script(&self.api.names())
    }

    /// `Unstarted -> Running`. Returns false from any other state.
    pub fn start(&mut self) -> bool {
        if self.state != HostState::Unstarted {
            warn!(session = self.session.short(), state = ?self.state, "bridge start ignored");
            return false;
        }
        self.state = HostState::Running;
        info!(
            session = self.session.short(),
            functions = self.api.len(),
            mode = ?self.dispatch_mode(),
            "bridge running"
        );
        true
    }

    /// Move to `Closed`. Idempotent. Calls still in flight are abandoned;
    /// their script-side promises stay unresolved.
    pub fn close(&mut self) {
        if self.state == HostState::Closed {
            return;
        }
        self.state = HostState::Closed;

        if !self.pending.is_empty() {
            debug!(
                session = self.session.short(),
                abandoned = self.pending.len(),
                "closing with calls in flight"
            );
            self.pending.clear();
        }

        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
        info!(session = self.session.short(), "bridge closed");
    }

    /// Handle one IPC body posted by script.
    ///
    /// Every call that carries an id is answered exactly once, inline or
    /// later via [`complete`](Self::complete). Only a transport failure is
    /// returned as an error.
    pub fn handle_ipc(&mut self, body: &str, sink: &dyn ScriptSink) -> Result<(), TransportError> {
        if !self.is_running() {
            debug!(body_len = body.len(), state = ?self.state, "IPC message ignored");
            return Ok(());
        }

        let call = match CallEnvelope::parse(body) {
            Ok(call) => call,
            Err(CallParseError::Unaddressable(e)) => {
                warn!(body_len = body.len(), error = %e, "IPC message rejected: no call id");
                return Ok(());
            }
            Err(CallParseError::Invalid { id, error }) => {
                warn!(call_id = %id, error = %error, "IPC call rejected");
                let result = ResultEnvelope::error(id, &DispatchError::Decode(error));
                return self.deliver(&result, sink);
            }
        };

        debug!(
            call_id = %call.id,
            function = %call.function_name,
            args = call.arguments.len(),
            "call received"
        );

        match &self.worker {
            None => {
                let outcome = self.api.dispatch(&call.function_name, call.arguments);
                let result = ResultEnvelope::from_dispatch(call.id, outcome);
                self.deliver(&result, sink)
            }
            Some(worker) => {
                if !self.pending.insert(call.id.clone()) {
                    warn!(call_id = %call.id, "call id reused while pending");
                    let error = DispatchError::DuplicateCall(call.id.clone());
                    return self.deliver(&ResultEnvelope::error(call.id, &error), sink);
                }
                worker.submit(Arc::clone(&self.api), call);
                Ok(())
            }
        }
    }

    /// Deliver a result produced by the worker pool.
    pub fn complete(
        &mut self,
        result: ResultEnvelope,
        sink: &dyn ScriptSink,
    ) -> Result<(), TransportError> {
        if !self.is_running() {
            debug!(call_id = %result.id, "completion dropped: window closed");
            return Ok(());
        }
        if !self.pending.remove(&result.id) {
            debug!(call_id = %result.id, "completion dropped: unknown call id");
            return Ok(());
        }
        self.deliver(&result, sink)
    }

    /// Deliver a push to the renderer's listeners.
    pub fn push(&mut self, push: &PushEnvelope, sink: &dyn ScriptSink) -> Result<(), TransportError> {
        if !self.is_running() {
            debug!(state = ?self.state, "push dropped");
            return Ok(());
        }
        debug!(session = self.session.short(), "push delivered");
        sink.evaluate_script(&ipc::js_push(push))
    }

    fn deliver(&self, result: &ResultEnvelope, sink: &dyn ScriptSink) -> Result<(), TransportError> {
        debug!(call_id = %result.id, ok = result.is_ok(), "result delivered");
        sink.evaluate_script(&ipc::js_resolve(result))
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
    }
}
