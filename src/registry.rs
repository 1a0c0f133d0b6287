//! Named handle kinds.
//!
//! Callers that only deal in tokens and strings (such as the C ABI) create
//! handles by kind name. The registry maps each name to a constructor for
//! a fresh handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::buffered::{BufferedHandle, Strategy};
use crate::error::{Error, Result};
use crate::handle::Handle;

/// Constructor for a fresh, empty handle.
pub type HandleCtor = Arc<dyn Fn() -> Box<dyn Handle> + Send + Sync>;

/// Registry of handle kinds.
#[derive(Default)]
pub struct Registry {
    kinds: RwLock<HashMap<String, HandleCtor>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffering handle with strategy `S` under `kind`.
    pub fn register<S: Strategy>(&self, kind: &str) {
        self.register_with(kind, || Box::new(BufferedHandle::<S>::new()));
    }

    /// Register an arbitrary constructor under `kind`.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_with<F>(&self, kind: &str, ctor: F)
    where
        F: Fn() -> Box<dyn Handle> + Send + Sync + 'static,
    {
        let previous = self.kinds.write().insert(kind.to_string(), Arc::new(ctor));
        if previous.is_some() {
            warn!(kind, "handle kind registered twice, replacing");
        }
    }

    /// Build a fresh handle of the named kind.
    pub fn instantiate(&self, kind: &str) -> Result<Box<dyn Handle>> {
        // Run the constructor outside the lock.
        let ctor = self
            .kinds
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))?;
        Ok(ctor())
    }

    /// Whether a kind of this name is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.read().contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds.read().keys().cloned().collect();
        kinds.sort();
        kinds
    }
}
