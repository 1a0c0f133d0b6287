//! C ABI for the handle layer.
//!
//! This module exposes the process-wide [`Device`](crate::Device) to C
//! callers. Rust callers should prefer the safe API on `Device`.

pub mod error;
pub mod exports;
pub mod handles;
pub mod raw;

pub use error::{error_code, error_from_rt, report, rt_error_free};
pub use exports::*;
pub use handles::*;
pub use raw::*;
