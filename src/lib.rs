//! Reference-counted opaque handles with deferred object construction.
//!
//! This crate implements the handle layer of an object-creation API. Callers
//! never see typed pointers; they receive [`RTHandle`] tokens, set named
//! parameters on them, and commit the handle to build the object it stands
//! for. API entry points get back to the object with a safe, typed cast.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
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
//! fn main() -> rthandle::Result<()> {
//!     let device = Device::new(None);
//!
//!     // Configure, then build.
//!     let sphere = device.new_handle(NormalHandle::<Sphere>::new())?;
//!     device.set(sphere, "radius", 2.0f32)?;
//!     device.commit(sphere)?;
//!
//!     // Parameter edits only show up after the next commit.
//!     device.set(sphere, "radius", 5.0f32)?;
//!     let s = device.cast_handle::<Sphere>(sphere, "sphere")?;
//!     assert_eq!(s.radius, 2.0);
//!
//!     // Prebuilt objects go through constant handles.
//!     let unit = device.new_constant(Arc::new(Sphere { radius: 1.0 }))?;
//!     assert!(device.commit(unit).is_err());
//!
//!     // Handles live until their last reference is released.
//!     device.inc_ref(sphere)?;
//!     assert!(!device.dec_ref(sphere)?);
//!     assert!(device.dec_ref(sphere)?);
//!     device.dec_ref(unit)?;
//!     Ok(())
//! }
//! ```
//!
//! # Threads
//!
//! `inc_ref` and `dec_ref` may be called from any thread. Configuring and
//! committing a given handle is expected to happen from one owner at a time.

pub mod buffered;
pub mod constant;
pub mod device;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod parms;
pub mod registry;
pub mod types;

// Re-export main types at the crate root
pub use buffered::{
    BufferedHandle, Construct, Factory, FactoryHandle, NormalHandle, Strategy, Upcast,
    ViaConstructor, ViaFactory,
};
pub use constant::ConstHandle;
pub use device::Device;
pub use error::{ConstructError, Error, Result};
pub use ffi::RTHandle;
pub use handle::{Handle, InstanceHandle};
pub use parms::Parms;
pub use registry::{HandleCtor, Registry};
pub use types::{DeviceOptions, Variant, VariantKind};

/// API version constants, taken from the package version.
pub mod version {
    const fn component(s: &str) -> i32 {
        let bytes = s.as_bytes();
        let mut value = 0;
        let mut i = 0;
        while i < bytes.len() {
            value = value * 10 + (bytes[i] - b'0') as i32;
            i += 1;
        }
        value
    }

    /// API major version.
    pub const MAJOR: i32 = component(env!("CARGO_PKG_VERSION_MAJOR"));
    /// API minor version.
    pub const MINOR: i32 = component(env!("CARGO_PKG_VERSION_MINOR"));
    /// API patch version.
    pub const PATCH: i32 = component(env!("CARGO_PKG_VERSION_PATCH"));
}

/// Get the API version string (e.g., "0.1.0").
pub fn api_version() -> String {
    format!("{}.{}.{}", version::MAJOR, version::MINOR, version::PATCH)
}

/// Check if this library can serve code built against `major.minor`.
///
/// The major version must match exactly; the requested minor version may
/// not be newer than this library's.
pub fn api_version_compatible(major: i32, minor: i32) -> bool {
    major == version::MAJOR && minor <= version::MINOR
}
