//! Buffering handles.
//!
//! A [`BufferedHandle`] collects parameters with `set` and only builds its
//! object when `create` is called. How the object is built is chosen by the
//! [`Strategy`] type parameter:
//!
//! * [`ViaConstructor<T, B>`] calls [`Construct::construct`] on `T` and
//!   stores the result as its base type `B` (by default `T` itself).
//! * [`ViaFactory<F>`] calls [`Factory::create`] on `F`, which may inspect the
//!   parameters to pick one of several implementations behind
//!   `F::Output`.
//!
//! # Example
//!
//! ```
//! use rthandle::{Construct, ConstructError, NormalHandle, Handle, InstanceHandle, Parms};
//!
//! struct Sphere {
//!     radius: f32,
//! }
//!
//! impl Construct for Sphere {
//!     fn construct(parms: &Parms) -> Result<Self, ConstructError> {
//!         Ok(Sphere { radius: parms.get_float("radius", 1.0) })
//!     }
//! }
//!
//! let mut handle = NormalHandle::<Sphere>::new();
//! handle.set("radius", 2.0f32.into())?;
//! handle.create()?;
//! assert_eq!(handle.instance().unwrap().radius, 2.0);
//! # Ok::<(), rthandle::Error>(())
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ConstructError, Error, Result};
use crate::handle::{Handle, InstanceHandle};
use crate::parms::Parms;
use crate::types::Variant;

/// Types built directly from buffered parameters.
pub trait Construct: Sized + Send + Sync + 'static {
    /// Build a value from the parameters buffered on the handle.
    ///
    /// The error is handed to the caller of `create` unchanged.
    fn construct(parms: &Parms) -> std::result::Result<Self, ConstructError>;
}

/// Conversion of a shared instance to the base type it is stored as.
///
/// Every type is its own base. To store a directly constructed type as a
/// trait object, implement the conversion for that trait object:
///
/// ```
/// use std::sync::Arc;
///
/// use rthandle::Upcast;
///
/// trait Shape: Send + Sync {}
/// struct Sphere;
/// impl Shape for Sphere {}
///
/// impl Upcast<dyn Shape> for Sphere {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Shape> {
///         self
///     }
/// }
/// ```
pub trait Upcast<B: ?Sized> {
    fn upcast(self: Arc<Self>) -> Arc<B>;
}

impl<T> Upcast<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Types that own a factory selecting among implementations.
///
/// `Output` is usually a trait object, for example `dyn Shape`.
pub trait Factory: 'static {
    type Output: ?Sized + Send + Sync + 'static;

    /// Pick an implementation from the parameters and build it.
    fn create(parms: &Parms) -> std::result::Result<Arc<Self::Output>, ConstructError>;
}

/// Turns buffered parameters into a shared instance.
pub trait Strategy: 'static {
    type Target: ?Sized + Send + Sync + 'static;

    fn build(parms: &Parms) -> std::result::Result<Arc<Self::Target>, ConstructError>;
}

/// Build through the constructor of `T`, storing the result as `B`.
pub struct ViaConstructor<T, B: ?Sized = T>(PhantomData<(fn() -> T, fn() -> Arc<B>)>);

impl<T, B> Strategy for ViaConstructor<T, B>
where
    T: Construct + Upcast<B>,
    B: ?Sized + Send + Sync + 'static,
{
    type Target = B;

    fn build(parms: &Parms) -> std::result::Result<Arc<B>, ConstructError> {
        let value = T::construct(parms)?;
        Ok(<T as Upcast<B>>::upcast(Arc::new(value)))
    }
}

/// Build through the target type's factory.
pub struct ViaFactory<F>(PhantomData<fn() -> F>);

impl<F: Factory> Strategy for ViaFactory<F> {
    type Target = F::Output;

    fn build(parms: &Parms) -> std::result::Result<Arc<F::Output>, ConstructError> {
        F::create(parms)
    }
}

/// Handle that buffers parameters and creates its object on demand.
pub struct BufferedHandle<S: Strategy> {
    parms: Parms,
    instance: Option<Arc<S::Target>>,
}

/// Buffering handle built by direct construction, stored as `B`.
pub type NormalHandle<T, B = T> = BufferedHandle<ViaConstructor<T, B>>;

/// Buffering handle built by a factory.
pub type FactoryHandle<F> = BufferedHandle<ViaFactory<F>>;

impl<S: Strategy> BufferedHandle<S> {
    /// Create a handle with no parameters and no instance.
    pub fn new() -> Self {
        Self {
            parms: Parms::new(),
            instance: None,
        }
    }

    /// Parameters that the next `create` will see.
    pub fn parms(&self) -> &Parms {
        &self.parms
    }
}

impl<S: Strategy> Default for BufferedHandle<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Strategy> fmt::Debug for BufferedHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedHandle")
            .field("target", &std::any::type_name::<S::Target>())
            .field("parms", &self.parms)
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}

impl<S: Strategy> Handle for BufferedHandle<S> {
    fn create(&mut self) -> Result<()> {
        // Only replace the instance once the build succeeded.
        let instance = S::build(&self.parms).map_err(Error::Construction)?;
        self.instance = Some(instance);
        Ok(())
    }

    fn clear(&mut self) {
        self.parms.clear();
    }

    fn set(&mut self, property: &str, value: Variant) -> Result<()> {
        self.parms.add(property, value);
        Ok(())
    }

    fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn instance_slot(&self) -> &dyn Any {
        &self.instance
    }
}

impl<S: Strategy> InstanceHandle for BufferedHandle<S> {
    type Target = S::Target;

    fn instance(&self) -> Option<&Arc<S::Target>> {
        self.instance.as_ref()
    }
}
