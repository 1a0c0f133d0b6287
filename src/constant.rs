//! Constant handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::handle::{Handle, InstanceHandle};
use crate::types::Variant;

/// A handle around an object that was built elsewhere.
///
/// Used to hand out shared objects, such as defaults, through the same
/// token interface as buffering handles. Setting parameters and recreating
/// the object are rejected; `clear` does nothing.
pub struct ConstHandle<B: ?Sized> {
    // Always `Some`. Same slot type as a buffering handle of base `B`.
    instance: Option<Arc<B>>,
}

impl<B: ?Sized + Send + Sync + 'static> ConstHandle<B> {
    /// Creates a constant handle from the object to reference.
    pub fn new(instance: Arc<B>) -> Self {
        Self {
            instance: Some(instance),
        }
    }
}

impl<B: ?Sized> fmt::Debug for ConstHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstHandle")
            .field("target", &std::any::type_name::<B>())
            .finish()
    }
}

impl<B: ?Sized + Send + Sync + 'static> Handle for ConstHandle<B> {
    fn create(&mut self) -> Result<()> {
        Err(Error::ConstantHandle)
    }

    fn set(&mut self, _property: &str, _value: Variant) -> Result<()> {
        Err(Error::ConstantHandle)
    }

    fn has_instance(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn instance_slot(&self) -> &dyn Any {
        &self.instance
    }
}

impl<B: ?Sized + Send + Sync + 'static> InstanceHandle for ConstHandle<B> {
    type Target = B;

    fn instance(&self) -> Option<&Arc<B>> {
        self.instance.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_is_rejected() {
        let mut handle = ConstHandle::new(Arc::new(42u32));
        assert!(handle.create().unwrap_err().is_constant_handle());
        assert!(handle
            .set("value", Variant::Int(7))
            .unwrap_err()
            .is_constant_handle());

        // clear is harmless and the instance survives everything above.
        handle.clear();
        assert_eq!(**handle.instance().unwrap(), 42);
    }

    #[test]
    fn test_shares_instance() {
        let shared: Arc<str> = Arc::from("default material");
        let handle = ConstHandle::new(Arc::clone(&shared));
        assert!(Arc::ptr_eq(handle.instance().unwrap(), &shared));
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(handle);
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
