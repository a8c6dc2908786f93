//! IPC protocol between the host and script running in the webview.
//!
//! Messages flow in both directions:
//! - **JS -> Rust**: the bridge proxy posts a [`CallEnvelope`] as JSON via
//!   `window.ipc.postMessage`, which reaches the webview's IPC handler.
//! - **Rust -> JS**: the host answers with a [`ResultEnvelope`] or sends an
//!   uncorrelated [`PushEnvelope`] by evaluating a call to the bridge's
//!   `_resolve` / `_push` entry points.

use dry_common::{DecodeError, DispatchError};
use serde::{Deserialize, Serialize};

use crate::codec::{self, Value};

/// A call from script to a registered host function.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEnvelope {
    pub id: String,
    pub function_name: String,
    pub arguments: Vec<Value>,
}

/// Why an incoming call could not be turned into a [`CallEnvelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallParseError {
    /// No correlation token could be recovered, so nothing can be answered.
    Unaddressable(DecodeError),
    /// The token is known; the caller gets an error result for it.
    Invalid { id: String, error: DecodeError },
}

impl CallEnvelope {
    /// Parse a raw IPC body.
    ///
    /// The id is extracted first so that any later problem (missing
    /// function name, undecodable arguments) can still be answered.
    pub fn parse(body: &str) -> Result<Self, CallParseError> {
        let raw: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| CallParseError::Unaddressable(DecodeError::Malformed(e.to_string())))?;

        let id = match raw.get("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(CallParseError::Unaddressable(DecodeError::InvalidEnvelope(
                    "missing or invalid id".into(),
                )))
            }
        };

        let invalid = |error: DecodeError| CallParseError::Invalid {
            id: id.clone(),
            error,
        };

        let function_name = match raw.get("functionName") {
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => {
                return Err(invalid(DecodeError::InvalidEnvelope(
                    "missing functionName".into(),
                )))
            }
        };

        let arguments = match raw.get("arguments") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(codec::decode)
                .collect::<Result<_, _>>()
                .map_err(invalid)?,
            Some(_) => {
                return Err(invalid(DecodeError::InvalidEnvelope(
                    "arguments must be an array".into(),
                )))
            }
        };

        Ok(Self {
            id,
            function_name,
            arguments,
        })
    }
}

/// Outcome half of a [`ResultEnvelope`]. Serialises as either
/// `"ok": <value>` or `"error": "<message>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "ok")]
    Ok(serde_json::Value),
    #[serde(rename = "error")]
    Err(String),
}

/// The answer to exactly one [`CallEnvelope`], carrying its token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResultEnvelope {
    /// Build from a dispatch outcome, encoding the return value. A value
    /// that cannot be encoded turns into an error result.
    pub fn from_dispatch(id: impl Into<String>, outcome: Result<Value, DispatchError>) -> Self {
        let outcome = match outcome.and_then(|v| codec::encode(&v).map_err(DispatchError::from)) {
            Ok(wire) => Outcome::Ok(wire),
            Err(e) => Outcome::Err(e.to_string()),
        };
        Self {
            id: id.into(),
            outcome,
        }
    }

    pub fn error(id: impl Into<String>, error: &DispatchError) -> Self {
        Self {
            id: id.into(),
            outcome: Outcome::Err(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }
}

/// A one-way message from host to script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub payload: serde_json::Value,
}

impl PushEnvelope {
    pub fn new(payload: &Value) -> Result<Self, dry_common::EncodeError> {
        Ok(Self {
            payload: codec::encode(payload)?,
        })
    }
}

/// Placeholder in [`BRIDGE_SCRIPT`] replaced with the registered names.
const FUNCTIONS_PLACEHOLDER: &str = "__DRY_FUNCTIONS__";

/// JavaScript that establishes the bridge proxy. Injected before any page
/// script runs; see [`bridge_script`] for the rendered form.
pub const BRIDGE_SCRIPT: &str = r#"
(function() {
    if (window.dry && window.dry._installed) { return; }

    var prefix = Math.random().toString(36).slice(2, 10);
    var counter = 0;
    var pending = {};
    var listeners = [];

    function nextId() {
        counter += 1;
        return prefix + '-' + counter.toString(36);
    }

    function call(name, args) {
        return new Promise(function(resolve, reject) {
            var id = nextId();
            var message;
            try {
                message = JSON.stringify({
                    id: id,
                    functionName: name,
                    arguments: Array.prototype.slice.call(args)
                });
            } catch (e) {
                reject(e);
                return;
            }
            pending[id] = { resolve: resolve, reject: reject };
            window.ipc.postMessage(message);
        });
    }

    // Not remote names: awaiting or serialising a stub must not post a call.
    var HIDDEN = { then: true, toJSON: true };
    var NATIVE = { call: true, apply: true, bind: true };

    function stub(path) {
        var fn = function() { return call(path, arguments); };
        return new Proxy(fn, {
            get: function(target, name) {
                if (typeof name !== 'string' || NATIVE[name]) { return target[name]; }
                if (HIDDEN[name]) { return undefined; }
                return stub(path + '.' + name);
            }
        });
    }

    window.api = new Proxy({}, {
        get: function(target, name) {
            if (typeof name !== 'string' || HIDDEN[name]) { return undefined; }
            return stub(name);
        }
    });

    window.dry = {
        _installed: true,
        functions: __DRY_FUNCTIONS__,
        onMessage: function(callback) {
            listeners.push(callback);
            return function() {
                var i = listeners.indexOf(callback);
                if (i >= 0) { listeners.splice(i, 1); }
            };
        },
        pendingCount: function() { return Object.keys(pending).length; },
        _resolve: function(envelope) {
            var slot = pending[envelope.id];
            if (!slot) { return; }
            delete pending[envelope.id];
            if (Object.prototype.hasOwnProperty.call(envelope, 'error')) {
                slot.reject(new Error(envelope.error));
            } else {
                slot.resolve(envelope.ok);
            }
        },
        _push: function(envelope) {
            var payload = envelope.payload;
            listeners.slice().forEach(function(listener) {
                try { listener(payload); } catch (e) { console.error(e); }
            });
            window.dispatchEvent(new CustomEvent('dry:message', { detail: payload }));
        }
    };
})();
"#;

/// Render the bridge script with the registered function names.
pub fn bridge_script(names: &[String]) -> String {
    let list = serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string());
    BRIDGE_SCRIPT.replace(FUNCTIONS_PLACEHOLDER, &list)
}

/// Generate the JS snippet that settles a pending call.
pub fn js_resolve(result: &ResultEnvelope) -> String {
    let json = serde_json::to_string(result).unwrap_or_else(|_| {
        format!(
            "{{\"id\":{},\"error\":\"result serialization failed\"}}",
            serde_json::Value::String(result.id.clone())
        )
    });
    format!("window.dry._resolve({json});")
}

/// Generate the JS snippet that delivers a push.
pub fn js_push(push: &PushEnvelope) -> String {
    let json = serde_json::to_string(push).unwrap_or_else(|_| "{\"payload\":null}".to_string());
    format!("window.dry._push({json});")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_call() {
        let call =
            CallEnvelope::parse(r#"{"id":"ab-1","functionName":"add","arguments":[2,3]}"#).unwrap();
        assert_eq!(call.id, "ab-1");
        assert_eq!(call.function_name, "add");
        assert_eq!(call.arguments, vec![Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn parse_defaults_missing_arguments() {
        let call = CallEnvelope::parse(r#"{"id":"x","functionName":"ping"}"#).unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn numeric_id_is_normalised() {
        let call = CallEnvelope::parse(r#"{"id":17,"functionName":"f","arguments":[]}"#).unwrap();
        assert_eq!(call.id, "17");
    }

    #[test]
    fn malformed_json_is_unaddressable() {
        let err = CallEnvelope::parse("abc123:hello,world").unwrap_err();
        assert!(matches!(
            err,
            CallParseError::Unaddressable(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn missing_id_is_unaddressable() {
        let err = CallEnvelope::parse(r#"{"functionName":"f"}"#).unwrap_err();
        assert!(matches!(err, CallParseError::Unaddressable(_)));
        let err = CallEnvelope::parse(r#"{"id":"","functionName":"f"}"#).unwrap_err();
        assert!(matches!(err, CallParseError::Unaddressable(_)));
    }

    #[test]
    fn missing_function_name_is_answerable() {
        let err = CallEnvelope::parse(r#"{"id":"q-1"}"#).unwrap_err();
        assert!(matches!(err, CallParseError::Invalid { ref id, .. } if id == "q-1"));
    }

    #[test]
    fn bad_arguments_are_answerable() {
        let err =
            CallEnvelope::parse(r#"{"id":"q-2","functionName":"f","arguments":{"a":1}}"#).unwrap_err();
        assert!(matches!(err, CallParseError::Invalid { ref id, .. } if id == "q-2"));
    }

    #[test]
    fn wide_integer_arguments_arrive_as_floats() {
        let call = CallEnvelope::parse(
            r#"{"id":"q-3","functionName":"f","arguments":[10000000000000000000]}"#,
        )
        .unwrap();
        assert_eq!(call.arguments, vec![Value::Float(1e19)]);
    }

    #[test]
    fn ok_result_serializes_flat() {
        let result = ResultEnvelope::from_dispatch("ab-1", Ok(Value::Int(5)));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, json!({"id": "ab-1", "ok": 5}));
        assert!(result.is_ok());
    }

    #[test]
    fn err_result_serializes_flat() {
        let result =
            ResultEnvelope::from_dispatch("ab-2", Err(DispatchError::NotFound("ghost".into())));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, json!({"id": "ab-2", "error": "function not found: ghost"}));
        assert!(!result.is_ok());
    }

    #[test]
    fn unencodable_return_becomes_error() {
        let result = ResultEnvelope::from_dispatch("ab-3", Ok(Value::Float(f64::NAN)));
        match result.outcome {
            Outcome::Err(msg) => assert!(msg.starts_with("encode error")),
            Outcome::Ok(_) => panic!("NaN must not encode"),
        }
    }

    #[test]
    fn result_envelope_parses_back() {
        let parsed: ResultEnvelope = serde_json::from_str(r#"{"id":"z","ok":[1,"a"]}"#).unwrap();
        assert_eq!(parsed.outcome, Outcome::Ok(json!([1, "a"])));
    }

    #[test]
    fn push_envelope_has_no_id() {
        let push = PushEnvelope::new(&Value::from_iter([("text", "hi")])).unwrap();
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json, json!({"payload": {"text": "hi"}}));
    }

    #[test]
    fn js_snippets_call_bridge_entry_points() {
        let result = ResultEnvelope::from_dispatch("a-1", Ok(Value::from("</script>")));
        let js = js_resolve(&result);
        assert_eq!(js, r#"window.dry._resolve({"id":"a-1","ok":"</script>"});"#);

        let push = PushEnvelope::new(&Value::Int(1)).unwrap();
        assert_eq!(js_push(&push), r#"window.dry._push({"payload":1});"#);
    }

    #[test]
    fn bridge_script_lists_functions() {
        let script = bridge_script(&["add".to_string(), "math.mul".to_string()]);
        assert!(script.contains(r#"functions: ["add","math.mul"]"#));
        assert!(!script.contains(FUNCTIONS_PLACEHOLDER));
        assert!(script.contains("window.ipc.postMessage"));
        assert!(script.contains("window.api = new Proxy"));
    }

    #[test]
    fn stubs_are_not_thenable_or_serialisable() {
        let script = bridge_script(&[]);
        assert!(script.contains("var HIDDEN = { then: true, toJSON: true };"));
        assert!(script.contains("var NATIVE = { call: true, apply: true, bind: true };"));
        // Both the root proxy and every nested stub consult the guards.
        assert_eq!(script.matches("HIDDEN[name]").count(), 2);
        assert!(script.contains("NATIVE[name]) { return target[name]; }"));
    }

    #[test]
    fn bridge_script_with_no_functions() {
        let script = bridge_script(&[]);
        assert!(script.contains("functions: []"));
    }
}
