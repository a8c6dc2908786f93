//! Registry of host functions callable from script.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use dry_common::DispatchError;
use tracing::debug;

use crate::codec::Value;

/// Error type a registered function may fail with. Anything that converts
/// into a boxed error works with `?`, including plain strings.
pub type CallableError = Box<dyn std::error::Error + Send + Sync>;

/// A registered host function.
pub type Callable = dyn Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync;

/// Named host functions exposed to script.
///
/// Registration is last-write-wins. Once handed to a running window the
/// map is shared read-only with worker threads, which is why entries are
/// reference counted.
#[derive(Clone, Default)]
pub struct Api {
    functions: HashMap<String, Arc<Callable>>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.functions.insert(name.clone(), Arc::new(f)).is_some() {
            debug!(function = %name, "replaced registered function");
        }
        self
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync + 'static,
    {
        self.register(name, f);
        self
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Invoke `name` with already-decoded arguments.
    ///
    /// Never panics: a failing or panicking function becomes an error
    /// outcome for the caller.
    pub fn dispatch(&self, name: &str, args: Vec<Value>) -> Result<Value, DispatchError> {
        let f = self
            .functions
            .get(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;

        let outcome = match catch_unwind(AssertUnwindSafe(|| f(args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DispatchError::CallableFailure(e.to_string())),
            Err(panic) => Err(DispatchError::Panicked(panic_message(panic.as_ref()))),
        };

        match &outcome {
            Ok(_) => debug!(function = name, "dispatch ok"),
            Err(e) => debug!(function = name, error = %e, "dispatch failed"),
        }
        outcome
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").field("functions", &self.names()).finish()
    }
}

impl<N, F> FromIterator<(N, F)> for Api
where
    N: Into<String>,
    F: Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = (N, F)>>(iter: I) -> Self {
        let mut api = Api::new();
        api.extend(iter);
        api
    }
}

impl<N, F> Extend<(N, F)> for Api
where
    N: Into<String>,
    F: Fn(Vec<Value>) -> Result<Value, CallableError> + Send + Sync + 'static,
{
    fn extend<I: IntoIterator<Item = (N, F)>>(&mut self, iter: I) {
        for (name, f) in iter {
            self.register(name, f);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
