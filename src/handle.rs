//! The handle contract.
//!
//! A handle is the object that sits behind an opaque [`RTHandle`] token.
//! The [`Device`] owns it together with its reference count; the traits here
//! describe what the device can do with it.
//!
//! There are exactly three implementations: a buffering handle constructed
//! directly, a buffering handle constructed through a factory, and a
//! constant handle. Which one sits behind a token never changes.
//!
//! [`RTHandle`]: crate::RTHandle
//! [`Device`]: crate::Device

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::types::Variant;

/// Capability set shared by all handles.
pub trait Handle: Any + Send {
    /// Recreate the object the handle refers to.
    ///
    /// On failure the previous instance, if any, stays in place.
    fn create(&mut self) -> Result<()>;

    /// Clear buffered parameters. The live instance is not touched.
    fn clear(&mut self) {}

    /// Set a parameter of the handle.
    fn set(&mut self, property: &str, value: Variant) -> Result<()>;

    /// Whether an instance is currently live.
    fn has_instance(&self) -> bool;

    /// The handle itself, for downcasting to its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The instance slot, an `Option<Arc<B>>` where `B` is the base type
    /// the handle is recovered as.
    ///
    /// Handles of different construction variants that store the same base
    /// type are recovered through the same cast.
    fn instance_slot(&self) -> &dyn Any;
}

/// A handle that exposes the instance it owns.
pub trait InstanceHandle: Handle {
    /// Type of the referenced object.
    type Target: ?Sized + Send + Sync;

    /// The live instance, or `None` before the first successful `create`.
    fn instance(&self) -> Option<&Arc<Self::Target>>;
}
