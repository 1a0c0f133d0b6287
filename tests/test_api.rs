//! API version tests.

use rthandle::version;

#[test]
fn test_api_version_matches_package() {
    let version = rthandle::api_version();
    assert_eq!(
        version,
        env!("CARGO_PKG_VERSION"),
        "api_version should report the package version"
    );
}

#[test]
fn test_api_version_compatible() {
    assert!(
        rthandle::api_version_compatible(version::MAJOR, version::MINOR),
        "own version should be compatible"
    );
    assert!(
        rthandle::api_version_compatible(version::MAJOR, 0),
        "older minor versions should be compatible"
    );
    assert!(
        !rthandle::api_version_compatible(version::MAJOR + 1, 0),
        "a newer major version should NOT be compatible"
    );
    assert!(
        !rthandle::api_version_compatible(version::MAJOR, version::MINOR + 1),
        "a newer minor version should NOT be compatible"
    );
}

#[test]
fn test_c_api_version() {
    unsafe {
        let ptr = rthandle::ffi::rt_api_version();
        assert!(!ptr.is_null(), "version string should not be null");
        let version = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        rthandle::ffi::rt_free_string(ptr);
        assert_eq!(version, rthandle::api_version());
    }
}
