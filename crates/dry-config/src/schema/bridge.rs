//! How calls from script are executed on the host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where registered functions run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// On the event loop thread; a slow function stalls the window.
    #[default]
    Inline,
    /// On a pool of blocking worker threads; results return out of order.
    Worker,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    pub dispatch: DispatchMode,
    /// Blocking threads available to worker dispatch (valid range: 1-64).
    pub worker_threads: usize,
    /// Per-call deadline in milliseconds. Worker dispatch only.
    pub call_timeout_ms: Option<u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Inline,
            worker_threads: 4,
            call_timeout_ms: None,
        }
    }
}

impl BridgeConfig {
    pub fn worker() -> Self {
        Self {
            dispatch: DispatchMode::Worker,
            ..Default::default()
        }
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}
