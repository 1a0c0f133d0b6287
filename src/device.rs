//! The handle table.
//!
//! A [`Device`] owns every handle it hands out. Callers only ever see
//! [`RTHandle`] tokens; the device keeps the reference count of each token
//! and destroys the handle, releasing its instance, when the count drops to
//! zero.
//!
//! # Example
//!
//! ```
//! use rthandle::{Construct, ConstructError, Device, NormalHandle, Parms};
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
//! let device = Device::new(None);
//! let sphere = device.new_handle(NormalHandle::<Sphere>::new())?;
//! device.set(sphere, "radius", 2.0f32)?;
//! device.commit(sphere)?;
//!
//! let instance = device.cast_handle::<Sphere>(sphere, "sphere")?;
//! assert_eq!(instance.radius, 2.0);
//!
//! assert!(device.dec_ref(sphere)?);
//! # Ok::<(), rthandle::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::buffered::{BufferedHandle, Strategy};
use crate::constant::ConstHandle;
use crate::error::{Error, Result};
use crate::ffi::RTHandle;
use crate::handle::Handle;
use crate::registry::Registry;
use crate::types::{DeviceOptions, Variant};

static GLOBAL: LazyLock<Device> = LazyLock::new(|| Device::new(None));

/// A handle together with the number of tokens referring to it.
struct HandleCell {
    refcount: AtomicUsize,
    handle: Mutex<Box<dyn Handle>>,
}

/// Table of live handles.
///
/// Reference counting is atomic and may be driven from any thread.
/// Parameter writes and instantiation of one handle are serialized per
/// handle; callers are still expected to configure and commit a handle
/// from a single owner.
pub struct Device {
    name: String,
    handle_limit: Option<usize>,
    next_id: AtomicU64,
    handles: RwLock<HashMap<u64, Arc<HandleCell>>>,
    registry: Registry,
}

impl Device {
    /// Create an empty device.
    pub fn new(options: Option<DeviceOptions>) -> Self {
        let opts = options.unwrap_or_default();
        debug!(device = %opts.name, limit = ?opts.handle_limit, "created device");
        Self {
            name: opts.name,
            handle_limit: opts.handle_limit,
            // 0 is the invalid token.
            next_id: AtomicU64::new(1),
            handles: RwLock::new(HashMap::new()),
            registry: Registry::new(),
        }
    }

    /// The process-wide device used by the C ABI.
    pub fn global() -> &'static Device {
        &GLOBAL
    }

    /// Label given in [`DeviceOptions::name`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kinds that [`new_named`](Self::new_named) can create.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a buffering handle kind on this device.
    pub fn register<S: Strategy>(&self, kind: &str) {
        self.registry.register::<S>(kind);
    }

    /// Store a handle and return its token with a reference count of 1.
    pub fn new_handle<H: Handle>(&self, handle: H) -> Result<RTHandle> {
        self.insert(Box::new(handle))
    }

    /// Create an empty buffering handle.
    pub fn new_buffered<S: Strategy>(&self) -> Result<RTHandle> {
        self.new_handle(BufferedHandle::<S>::new())
    }

    /// Wrap an already built object in a constant handle.
    pub fn new_constant<B>(&self, instance: Arc<B>) -> Result<RTHandle>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        self.new_handle(ConstHandle::new(instance))
    }

    /// Create a handle of a registered kind.
    pub fn new_named(&self, kind: &str) -> Result<RTHandle> {
        let handle = self.registry.instantiate(kind)?;
        let token = self.insert(handle)?;
        debug!(device = %self.name, handle = %token, kind, "created named handle");
        Ok(token)
    }

    fn insert(&self, handle: Box<dyn Handle>) -> Result<RTHandle> {
        let cell = Arc::new(HandleCell {
            refcount: AtomicUsize::new(1),
            handle: Mutex::new(handle),
        });

        let mut handles = self.handles.write();
        if let Some(limit) = self.handle_limit {
            if handles.len() >= limit {
                warn!(device = %self.name, limit, "handle limit reached");
                return Err(Error::HandleLimit(limit));
            }
        }
        let token = RTHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        handles.insert(token.as_raw(), cell);
        drop(handles);

        debug!(device = %self.name, handle = %token, "created handle");
        Ok(token)
    }

    fn cell(&self, token: RTHandle) -> Result<Arc<HandleCell>> {
        self.handles
            .read()
            .get(&token.as_raw())
            .cloned()
            .ok_or(Error::UnknownHandle)
    }

    /// Buffer a parameter on the handle.
    pub fn set(&self, token: RTHandle, property: &str, value: impl Into<Variant>) -> Result<()> {
        let cell = self.cell(token)?;
        let value = value.into();
        trace!(device = %self.name, handle = %token, property, kind = ?value.kind(), "set parameter");
        let mut handle = cell.handle.lock();
        handle.set(property, value)
    }

    /// Clear buffered parameters. The live instance is kept.
    pub fn clear(&self, token: RTHandle) -> Result<()> {
        let cell = self.cell(token)?;
        trace!(device = %self.name, handle = %token, "clear parameters");
        cell.handle.lock().clear();
        Ok(())
    }

    /// (Re)create the object behind the handle from its buffered parameters.
    ///
    /// On failure the handle keeps its previous instance and parameters.
    pub fn commit(&self, token: RTHandle) -> Result<()> {
        let cell = self.cell(token)?;
        let mut handle = cell.handle.lock();
        match handle.create() {
            Ok(()) => {
                debug!(device = %self.name, handle = %token, "created instance");
                Ok(())
            }
            Err(e) => {
                warn!(device = %self.name, handle = %token, error = %e, "instance creation failed");
                Err(e)
            }
        }
    }

    /// Increment the reference count of a handle.
    pub fn inc_ref(&self, token: RTHandle) -> Result<()> {
        let cell = self.cell(token)?;
        // A count of zero means the handle is being destroyed.
        let prev = cell
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n != 0).then(|| n + 1)
            })
            .map_err(|_| Error::UnknownHandle)?;
        trace!(device = %self.name, handle = %token, refcount = prev + 1, "inc ref");
        Ok(())
    }

    /// Decrement the reference count of a handle.
    ///
    /// Returns `true` if this call dropped the count to zero and destroyed
    /// the handle. A destroyed token is unknown to every later call.
    pub fn dec_ref(&self, token: RTHandle) -> Result<bool> {
        let cell = self.cell(token)?;
        let prev = cell
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| Error::UnknownHandle)?;
        trace!(device = %self.name, handle = %token, refcount = prev - 1, "dec ref");
        if prev != 1 {
            return Ok(false);
        }

        let removed = self.handles.write().remove(&token.as_raw());
        // The handle, and with it the instance reference, is dropped here,
        // outside the table lock.
        drop(removed);
        drop(cell);
        debug!(device = %self.name, handle = %token, "destroyed handle");
        Ok(true)
    }

    /// Current reference count of a handle.
    pub fn ref_count(&self, token: RTHandle) -> Result<usize> {
        Ok(self.cell(token)?.refcount.load(Ordering::Acquire))
    }

    /// Whether the token refers to a live handle.
    pub fn contains(&self, token: RTHandle) -> bool {
        self.handles.read().contains_key(&token.as_raw())
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    /// Whether no handle is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Safe handle cast returning the live instance as base type `B`.
    ///
    /// Every handle that stores its instance as `B` is accepted: directly
    /// constructed, factory-built, and constant handles alike. Fails with
    /// [`Error::InvalidHandle`] if the token does not refer to such a
    /// handle, and with [`Error::InvalidValue`] if that handle has not been
    /// successfully committed yet. `name` is used in both error messages.
    pub fn cast_handle<B>(&self, token: RTHandle, name: &str) -> Result<Arc<B>>
    where
        B: ?Sized + Send + Sync + 'static,
    {
        let cell = self
            .cell(token)
            .map_err(|_| Error::InvalidHandle(name.to_string()))?;
        let guard = cell.handle.lock();
        let instance = guard
            .instance_slot()
            .downcast_ref::<Option<Arc<B>>>()
            .ok_or_else(|| Error::InvalidHandle(name.to_string()))?
            .clone();
        instance.ok_or_else(|| Error::InvalidValue(name.to_string()))
    }

    /// Safe handle cast giving access to the concrete handle.
    ///
    /// Checks that the token refers to a committed handle of exactly type
    /// `H`, then runs `f` on it. The handle stays locked while `f` runs,
    /// so `f` must not operate on the same token through this device.
    pub fn with_handle<H, R, F>(&self, token: RTHandle, name: &str, f: F) -> Result<R>
    where
        H: Handle,
        F: FnOnce(&H) -> R,
    {
        let cell = self
            .cell(token)
            .map_err(|_| Error::InvalidHandle(name.to_string()))?;
        let guard = cell.handle.lock();
        let handle = guard
            .as_any()
            .downcast_ref::<H>()
            .ok_or_else(|| Error::InvalidHandle(name.to_string()))?;
        if !handle.has_instance() {
            return Err(Error::InvalidValue(name.to_string()));
        }
        Ok(f(handle))
    }
}
