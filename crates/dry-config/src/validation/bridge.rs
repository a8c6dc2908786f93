//! Dispatch mode, worker pool and timeout checks.

use crate::schema::{DispatchMode, WindowConfig};

use super::helpers::validate_range;

pub(crate) fn validate_bridge(errors: &mut Vec<String>, config: &WindowConfig) {
    let bridge = &config.bridge;

    validate_range(
        errors,
        "bridge.worker_threads",
        bridge.worker_threads as u64,
        1,
        64,
    );

    if let Some(ms) = bridge.call_timeout_ms {
        if ms == 0 {
            errors.push("bridge.call_timeout_ms must be positive".into());
        }
        if bridge.dispatch != DispatchMode::Worker {
            errors.push("bridge.call_timeout_ms requires dispatch = \"worker\"".into());
        }
    }
}
