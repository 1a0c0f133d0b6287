//! C-compatible error codes and structures.

use std::os::raw::{c_char, c_int};

/// Error code returned by the exported C functions.
pub type RtErrorCode = c_int;

// Error codes
pub const RT_OK: RtErrorCode = 0;
pub const RT_ERR_INVALID_HANDLE: RtErrorCode = 1;
pub const RT_ERR_INVALID_VALUE: RtErrorCode = 2;
pub const RT_ERR_CONSTANT_HANDLE: RtErrorCode = 3;
pub const RT_ERR_CONSTRUCTION: RtErrorCode = 4;
pub const RT_ERR_UNKNOWN_HANDLE: RtErrorCode = 5;
pub const RT_ERR_UNKNOWN_KIND: RtErrorCode = 6;
pub const RT_ERR_INVALID_ARGUMENT: RtErrorCode = 7;
pub const RT_ERR_HANDLE_LIMIT: RtErrorCode = 8;
pub const RT_ERR_PANIC: RtErrorCode = 9;

/// Number of floats in a transform parameter.
pub const RT_TRANSFORM_LEN: usize = 12;

/// C error structure.
///
/// `message` is owned by the library and released by `rt_error_free`.
#[repr(C)]
#[derive(Debug)]
pub struct RtError {
    pub code: RtErrorCode,
    pub message: *mut c_char,
}

impl Default for RtError {
    fn default() -> Self {
        Self {
            code: RT_OK,
            message: std::ptr::null_mut(),
        }
    }
}
