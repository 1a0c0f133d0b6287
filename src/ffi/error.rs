//! Error conversion utilities for FFI.

use std::ffi::{CStr, CString};

use super::raw::{
    RtError, RtErrorCode, RT_ERR_CONSTANT_HANDLE, RT_ERR_CONSTRUCTION, RT_ERR_HANDLE_LIMIT,
    RT_ERR_INVALID_ARGUMENT, RT_ERR_INVALID_HANDLE, RT_ERR_INVALID_VALUE, RT_ERR_UNKNOWN_HANDLE,
    RT_ERR_PANIC, RT_ERR_UNKNOWN_KIND, RT_OK,
};
use crate::error::{Error, Result};

/// The C error code for an error.
pub fn error_code(err: &Error) -> RtErrorCode {
    match err {
        Error::InvalidHandle(_) => RT_ERR_INVALID_HANDLE,
        Error::InvalidValue(_) => RT_ERR_INVALID_VALUE,
        Error::ConstantHandle => RT_ERR_CONSTANT_HANDLE,
        Error::Construction(_) => RT_ERR_CONSTRUCTION,
        Error::UnknownHandle => RT_ERR_UNKNOWN_HANDLE,
        Error::UnknownKind(_) => RT_ERR_UNKNOWN_KIND,
        Error::InvalidArgument(_) => RT_ERR_INVALID_ARGUMENT,
        Error::HandleLimit(_) => RT_ERR_HANDLE_LIMIT,
        Error::Panic(_) => RT_ERR_PANIC,
    }
}

/// Convert a result to an error code, filling `out` on failure.
///
/// A message still held by `out` is freed before it is overwritten.
///
/// # Safety
///
/// `out` must be null or point to a writable `RtError` whose message is
/// null or was allocated by this library.
pub unsafe fn report(result: Result<()>, out: *mut RtError) -> RtErrorCode {
    let err = match result {
        Ok(()) => return RT_OK,
        Err(err) => err,
    };

    let code = error_code(&err);
    if !out.is_null() {
        // Interior NULs cannot cross the boundary.
        let message = err.to_string().replace('\0', " ");
        let message = CString::new(message).unwrap_or_default();
        rt_error_free(out);
        *out = RtError {
            code,
            message: message.into_raw(),
        };
    }
    code
}

/// Convert an RtError back into a Rust Error and free the message.
///
/// # Safety
///
/// The `err` pointer must be valid and filled by this library.
pub unsafe fn error_from_rt(err: *mut RtError) -> Error {
    if err.is_null() {
        return Error::InvalidArgument("null error pointer".to_string());
    }

    let err_ref = &*err;
    let code = err_ref.code;
    let message = if err_ref.message.is_null() {
        String::new()
    } else {
        CStr::from_ptr(err_ref.message)
            .to_string_lossy()
            .into_owned()
    };

    rt_error_free(err);

    match code {
        RT_OK => Error::InvalidArgument("no error reported".to_string()),
        RT_ERR_INVALID_HANDLE => Error::InvalidHandle(strip(&message, "invalid ", " handle")),
        RT_ERR_INVALID_VALUE => Error::InvalidValue(strip(&message, "invalid ", " value")),
        RT_ERR_CONSTANT_HANDLE => Error::ConstantHandle,
        RT_ERR_UNKNOWN_HANDLE => Error::UnknownHandle,
        RT_ERR_UNKNOWN_KIND => {
            Error::UnknownKind(strip(&message, "unknown handle kind: ", ""))
        }
        RT_ERR_INVALID_ARGUMENT => {
            Error::InvalidArgument(strip(&message, "invalid argument: ", ""))
        }
        RT_ERR_HANDLE_LIMIT => Error::HandleLimit(
            strip(&message, "handle limit of ", " reached")
                .parse()
                .unwrap_or(0),
        ),
        RT_ERR_PANIC => Error::Panic(strip(&message, "panic: ", "")),
        RT_ERR_CONSTRUCTION => Error::construction(message),
        _ => Error::InvalidArgument(format!("unknown error code {}: {}", code, message)),
    }
}

fn strip(message: &str, prefix: &str, suffix: &str) -> String {
    message
        .strip_prefix(prefix)
        .and_then(|m| m.strip_suffix(suffix))
        .unwrap_or(message)
        .to_string()
}

/// Free the message of an error filled by this library.
///
/// Safe to call on a default (empty) error and to call twice.
///
/// # Safety
///
/// `err` must be null or point to an `RtError` whose message is null or
/// was allocated by this library.
#[no_mangle]
pub unsafe extern "C" fn rt_error_free(err: *mut RtError) {
    if err.is_null() {
        return;
    }
    let err = &mut *err;
    if !err.message.is_null() {
        drop(CString::from_raw(err.message));
        err.message = std::ptr::null_mut();
    }
    err.code = RT_OK;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_round_trips_kind() {
        let mut err = RtError::default();
        let code = unsafe { report(Err(Error::InvalidHandle("light".into())), &mut err) };
        assert_eq!(code, RT_ERR_INVALID_HANDLE);
        assert_eq!(err.code, RT_ERR_INVALID_HANDLE);

        match unsafe { error_from_rt(&mut err) } {
            Error::InvalidHandle(name) => assert_eq!(name, "light"),
            other => panic!("expected InvalidHandle, got {:?}", other),
        }
        assert!(err.message.is_null(), "message should be freed");
    }

    #[test]
    fn test_report_ok_leaves_error_untouched() {
        let mut err = RtError::default();
        let code = unsafe { report(Ok(()), &mut err) };
        assert_eq!(code, RT_OK);
        assert!(err.message.is_null());
    }

    #[test]
    fn test_report_frees_previous_message() {
        let mut err = RtError::default();
        unsafe {
            report(Err(Error::UnknownKind("light".into())), &mut err);
            report(Err(Error::ConstantHandle), &mut err);
            assert_eq!(err.code, RT_ERR_CONSTANT_HANDLE);
            assert!(error_from_rt(&mut err).is_constant_handle());
        }
        assert!(err.message.is_null());
    }

    #[test]
    fn test_error_from_rt_without_error() {
        let mut err = RtError::default();
        match unsafe { error_from_rt(&mut err) } {
            Error::InvalidArgument(msg) => assert_eq!(msg, "no error reported"),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }

        err.code = 42;
        match unsafe { error_from_rt(&mut err) } {
            Error::InvalidArgument(msg) => assert_eq!(msg, "unknown error code 42: "),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_round_trips() {
        let mut err = RtError::default();
        let code = unsafe { report(Err(Error::Panic("boom".into())), &mut err) };
        assert_eq!(code, RT_ERR_PANIC);
        match unsafe { error_from_rt(&mut err) } {
            Error::Panic(msg) => assert_eq!(msg, "boom"),
            other => panic!("expected Panic, got {:?}", other),
        }
    }

    #[test]
    fn test_report_without_out_pointer() {
        let code = unsafe { report(Err(Error::ConstantHandle), std::ptr::null_mut()) };
        assert_eq!(code, RT_ERR_CONSTANT_HANDLE);
    }
}
