//! Exported C functions.
//!
//! Every function operates on [`Device::global()`]. Fallible functions
//! return an [`RtErrorCode`] and, when `err` is not null, fill it with the
//! code and a message that must be released with `rt_error_free`.
//!
//! Panics raised by handle code, such as a panicking constructor, never
//! unwind into the caller. They are reported as `RT_ERR_PANIC`, and the
//! handle stays usable.

use std::any::Any;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_float, c_int};
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use super::error::report;
use super::handles::RTHandle;
use super::raw::{RtError, RtErrorCode, RT_TRANSFORM_LEN};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::types::Variant;

/// Borrow a C string argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives
/// the returned reference.
unsafe fn str_arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{} is null", what)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| Error::InvalidArgument(format!("{} is not valid UTF-8", what)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run an export body and report its result.
///
/// # Safety
///
/// `err` must be null or writable.
unsafe fn guarded<F>(err: *mut RtError, body: F) -> RtErrorCode
where
    F: FnOnce() -> Result<()>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            warn!(error = %message, "panic caught at the C boundary");
            Err(Error::Panic(message))
        }
    };
    report(result, err)
}

unsafe fn set_parameter(
    handle: RTHandle,
    property: *const c_char,
    value: Variant,
    err: *mut RtError,
) -> RtErrorCode {
    guarded(err, || {
        let property = str_arg(property, "property")?;
        Device::global().set(handle, property, value)
    })
}

/// Create a handle of a registered kind.
///
/// # Safety
///
/// `kind` must be a valid C string, `out` must be writable, and `err` must
/// be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_new_handle(
    kind: *const c_char,
    out: *mut RTHandle,
    err: *mut RtError,
) -> RtErrorCode {
    if out.is_null() {
        return report(Err(Error::InvalidArgument("out is null".to_string())), err);
    }
    *out = RTHandle::invalid();
    guarded(err, || {
        let kind = str_arg(kind, "kind")?;
        *out = Device::global().new_named(kind)?;
        Ok(())
    })
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_bool1(
    handle: RTHandle,
    property: *const c_char,
    x: bool,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Bool(x), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_int1(
    handle: RTHandle,
    property: *const c_char,
    x: c_int,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Int(x), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_int2(
    handle: RTHandle,
    property: *const c_char,
    x: c_int,
    y: c_int,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Int2([x, y]), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_int3(
    handle: RTHandle,
    property: *const c_char,
    x: c_int,
    y: c_int,
    z: c_int,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Int3([x, y, z]), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_int4(
    handle: RTHandle,
    property: *const c_char,
    x: c_int,
    y: c_int,
    z: c_int,
    w: c_int,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Int4([x, y, z, w]), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_float1(
    handle: RTHandle,
    property: *const c_char,
    x: c_float,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Float(x), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_float2(
    handle: RTHandle,
    property: *const c_char,
    x: c_float,
    y: c_float,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Float2([x, y]), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_float3(
    handle: RTHandle,
    property: *const c_char,
    x: c_float,
    y: c_float,
    z: c_float,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Float3([x, y, z]), err)
}

/// # Safety
///
/// `property` must be a valid C string; `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_float4(
    handle: RTHandle,
    property: *const c_char,
    x: c_float,
    y: c_float,
    z: c_float,
    w: c_float,
    err: *mut RtError,
) -> RtErrorCode {
    set_parameter(handle, property, Variant::Float4([x, y, z, w]), err)
}

/// # Safety
///
/// `property` and `value` must be valid C strings; `err` must be null or
/// writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_string(
    handle: RTHandle,
    property: *const c_char,
    value: *const c_char,
    err: *mut RtError,
) -> RtErrorCode {
    match str_arg(value, "value") {
        Ok(v) => set_parameter(handle, property, Variant::String(v.to_owned()), err),
        Err(e) => report(Err(e), err),
    }
}

/// Set an affine 3x4 transform given as 12 row-major floats.
///
/// # Safety
///
/// `property` must be a valid C string, `m` must point to 12 readable
/// floats, and `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_set_transform(
    handle: RTHandle,
    property: *const c_char,
    m: *const c_float,
    err: *mut RtError,
) -> RtErrorCode {
    if m.is_null() {
        return report(Err(Error::InvalidArgument("transform is null".to_string())), err);
    }
    let mut xfm = [0.0f32; RT_TRANSFORM_LEN];
    xfm.copy_from_slice(std::slice::from_raw_parts(m, RT_TRANSFORM_LEN));
    set_parameter(handle, property, Variant::Transform(xfm), err)
}

/// Clear the buffered parameters of a handle.
///
/// # Safety
///
/// `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_clear(handle: RTHandle, err: *mut RtError) -> RtErrorCode {
    guarded(err, || Device::global().clear(handle))
}

/// Create the object behind a handle from its buffered parameters.
///
/// # Safety
///
/// `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_commit(handle: RTHandle, err: *mut RtError) -> RtErrorCode {
    guarded(err, || Device::global().commit(handle))
}

/// # Safety
///
/// `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_inc_ref(handle: RTHandle, err: *mut RtError) -> RtErrorCode {
    guarded(err, || Device::global().inc_ref(handle))
}

/// # Safety
///
/// `err` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn rt_dec_ref(handle: RTHandle, err: *mut RtError) -> RtErrorCode {
    // Destroying the handle drops its instance, which runs user code.
    guarded(err, || Device::global().dec_ref(handle).map(|_| ()))
}

/// Get the API version string. Free with `rt_free_string`.
#[no_mangle]
pub extern "C" fn rt_api_version() -> *mut c_char {
    CString::new(crate::api_version())
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Free a string returned by this library.
///
/// # Safety
///
/// `s` must be null or a string returned by this library, freed once.
#[no_mangle]
pub unsafe extern "C" fn rt_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
