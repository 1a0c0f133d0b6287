//! C ABI tests.
//!
//! These run against the process-wide device, so every test registers its
//! own kind names.

use std::ffi::CString;
use std::sync::Arc;

use rthandle::ffi::{
    self, RtError, RT_ERR_CONSTANT_HANDLE, RT_ERR_CONSTRUCTION, RT_ERR_PANIC, RT_OK,
};
use rthandle::{
    Construct, ConstructError, Device, Error, NormalHandle, Parms, RTHandle, ViaConstructor,
};

struct Camera {
    fov: f32,
    resolution: [i32; 2],
    name: String,
    xfm: [f32; 12],
    visible: bool,
}

impl Construct for Camera {
    fn construct(parms: &Parms) -> Result<Self, ConstructError> {
        let fov = parms.get_float("fov", 64.0);
        if !(0.0..180.0).contains(&fov) {
            return Err(format!("fov out of range: {}", fov).into());
        }
        Ok(Camera {
            fov,
            resolution: parms.get_int2("resolution", [640, 480]),
            name: parms.get_string("name", "camera").to_string(),
            xfm: parms.get_transform("local2world", [0.0; 12]),
            visible: parms.get_bool("visible", true),
        })
    }
}

struct Material {
    color: [f32; 3],
    uv_scale: [f32; 2],
    tint: [f32; 4],
    tiles: [i32; 3],
    layers: [i32; 4],
}

impl Construct for Material {
    fn construct(parms: &Parms) -> Result<Self, ConstructError> {
        Ok(Material {
            color: parms.get_float3("color", [0.5; 3]),
            uv_scale: parms.get_float2("uvScale", [1.0; 2]),
            tint: parms.get_float4("tint", [1.0; 4]),
            tiles: parms.get_int3("tiles", [1; 3]),
            layers: parms.get_int4("layers", [0; 4]),
        })
    }
}

/// Panics when asked to pick a missing texture.
struct Texture {
    texel: f32,
}

impl Construct for Texture {
    fn construct(parms: &Parms) -> Result<Self, ConstructError> {
        let texels: Vec<f32> = Vec::new();
        if parms.get_bool("missing", false) {
            let index = parms.get_int("index", 0) as usize;
            return Ok(Texture {
                texel: texels[index],
            });
        }
        Ok(Texture { texel: 0.25 })
    }
}

fn new_handle(kind: &str) -> RTHandle {
    let kind = CString::new(kind).unwrap();
    let mut handle = RTHandle::invalid();
    let mut err = RtError::default();
    let code = unsafe { ffi::rt_new_handle(kind.as_ptr(), &mut handle, &mut err) };
    assert_eq!(code, RT_OK, "rt_new_handle should succeed");
    assert!(handle.is_valid());
    handle
}

#[test]
fn test_configure_and_commit() {
    Device::global().register::<ViaConstructor<Camera>>("ffi-pinhole");
    let h = new_handle("ffi-pinhole");

    let fov = CString::new("fov").unwrap();
    let res = CString::new("resolution").unwrap();
    let name = CString::new("name").unwrap();
    let value = CString::new("main").unwrap();
    let xfm_name = CString::new("local2world").unwrap();
    let visible = CString::new("visible").unwrap();
    let xfm: [f32; 12] = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 5.0];

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_set_float1(h, fov.as_ptr(), 45.0, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_int2(h, res.as_ptr(), 1920, 1080, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_string(h, name.as_ptr(), value.as_ptr(), &mut err), RT_OK);
        assert_eq!(ffi::rt_set_transform(h, xfm_name.as_ptr(), xfm.as_ptr(), &mut err), RT_OK);
        assert_eq!(ffi::rt_set_bool1(h, visible.as_ptr(), false, &mut err), RT_OK);
        assert_eq!(ffi::rt_commit(h, &mut err), RT_OK);
    }

    let camera = Device::global()
        .cast_handle::<Camera>(h, "camera")
        .expect("camera should be live");
    assert_eq!(camera.fov, 45.0);
    assert_eq!(camera.resolution, [1920, 1080]);
    assert_eq!(camera.name, "main");
    assert_eq!(camera.xfm[11], 5.0);
    assert!(!camera.visible);

    unsafe {
        assert_eq!(ffi::rt_dec_ref(h, std::ptr::null_mut()), RT_OK);
    }
    assert!(!Device::global().contains(h));
}

#[test]
fn test_vector_setters_and_clear() {
    Device::global().register::<ViaConstructor<Material>>("ffi-material");
    let h = new_handle("ffi-material");

    let color = CString::new("color").unwrap();
    let uv = CString::new("uvScale").unwrap();
    let tint = CString::new("tint").unwrap();
    let tiles = CString::new("tiles").unwrap();
    let layers = CString::new("layers").unwrap();

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_set_float3(h, color.as_ptr(), 1.0, 0.0, 0.0, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_float2(h, uv.as_ptr(), 2.0, 4.0, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_float4(h, tint.as_ptr(), 0.1, 0.2, 0.3, 0.4, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_int3(h, tiles.as_ptr(), 2, 3, 4, &mut err), RT_OK);
        assert_eq!(ffi::rt_set_int4(h, layers.as_ptr(), 1, 2, 3, 4, &mut err), RT_OK);
        assert_eq!(ffi::rt_commit(h, &mut err), RT_OK);
    }

    let material = Device::global()
        .cast_handle::<Material>(h, "material")
        .expect("material should be live");
    assert_eq!(material.color, [1.0, 0.0, 0.0]);
    assert_eq!(material.uv_scale, [2.0, 4.0]);
    assert_eq!(material.tint, [0.1, 0.2, 0.3, 0.4]);
    assert_eq!(material.tiles, [2, 3, 4]);
    assert_eq!(material.layers, [1, 2, 3, 4]);

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_clear(h, &mut err), RT_OK);
        let buffered = Device::global()
            .with_handle(h, "material", |m: &NormalHandle<Material>| m.parms().len())
            .unwrap();
        assert_eq!(buffered, 0, "clear should drop buffered parameters");

        // The live instance survives until the next commit.
        let live = Device::global().cast_handle::<Material>(h, "material").unwrap();
        assert_eq!(live.tiles, [2, 3, 4]);

        assert_eq!(ffi::rt_commit(h, &mut err), RT_OK);
        let rebuilt = Device::global().cast_handle::<Material>(h, "material").unwrap();
        assert_eq!(rebuilt.tiles, [1, 1, 1]);
        assert_eq!(rebuilt.layers, [0; 4]);

        assert_eq!(ffi::rt_dec_ref(h, &mut err), RT_OK);
    }
}

#[test]
fn test_panicking_constructor_is_reported() {
    Device::global().register::<ViaConstructor<Texture>>("ffi-texture");
    let h = new_handle("ffi-texture");
    let missing = CString::new("missing").unwrap();

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_commit(h, &mut err), RT_OK);

        assert_eq!(ffi::rt_set_bool1(h, missing.as_ptr(), true, &mut err), RT_OK);
        assert_eq!(ffi::rt_commit(h, &mut err), RT_ERR_PANIC);
        match ffi::error_from_rt(&mut err) {
            Error::Panic(msg) => assert!(msg.contains("index out of bounds"), "got {}", msg),
            other => panic!("expected Panic, got {:?}", other),
        }

        // The handle is still usable after the panic.
        let texture = Device::global().cast_handle::<Texture>(h, "texture").unwrap();
        assert_eq!(texture.texel, 0.25);
        assert_eq!(ffi::rt_set_bool1(h, missing.as_ptr(), false, &mut err), RT_OK);
        assert_eq!(ffi::rt_commit(h, &mut err), RT_OK);
        assert_eq!(ffi::rt_dec_ref(h, &mut err), RT_OK);
    }
    assert!(!Device::global().contains(h));
}

#[test]
fn test_construction_error_reported() {
    Device::global().register::<ViaConstructor<Camera>>("ffi-bad-camera");
    let h = new_handle("ffi-bad-camera");
    let fov = CString::new("fov").unwrap();

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_set_float1(h, fov.as_ptr(), 270.0, &mut err), RT_OK);
        let code = ffi::rt_commit(h, &mut err);
        assert_eq!(code, RT_ERR_CONSTRUCTION);
        assert!(!err.message.is_null(), "message should be set");
        match ffi::error_from_rt(&mut err) {
            Error::Construction(e) => assert_eq!(e.to_string(), "fov out of range: 270"),
            other => panic!("expected Construction, got {:?}", other),
        }

        ffi::rt_dec_ref(h, std::ptr::null_mut());
    }
}

#[test]
fn test_constant_handle_over_c_abi() {
    let h = Device::global()
        .new_constant(Arc::new(7u64))
        .expect("new_constant should succeed");
    let name = CString::new("value").unwrap();

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_set_int1(h, name.as_ptr(), 1, &mut err), RT_ERR_CONSTANT_HANDLE);
        ffi::rt_error_free(&mut err);
        assert_eq!(ffi::rt_commit(h, &mut err), RT_ERR_CONSTANT_HANDLE);
        assert!(ffi::error_from_rt(&mut err).is_constant_handle());
        assert_eq!(ffi::rt_clear(h, &mut err), RT_OK);
    }

    let value = Device::global()
        .cast_handle::<u64>(h, "value")
        .unwrap();
    assert_eq!(*value, 7);

    unsafe {
        assert_eq!(ffi::rt_dec_ref(h, std::ptr::null_mut()), RT_OK);
    }
}

#[test]
fn test_retain_release() {
    Device::global().register::<ViaConstructor<Camera>>("ffi-retained");
    let h = new_handle("ffi-retained");

    unsafe {
        let mut err = RtError::default();
        assert_eq!(ffi::rt_inc_ref(h, &mut err), RT_OK);
        assert_eq!(Device::global().ref_count(h).unwrap(), 2);
        assert_eq!(ffi::rt_dec_ref(h, &mut err), RT_OK);
        assert!(Device::global().contains(h));
        assert_eq!(ffi::rt_dec_ref(h, &mut err), RT_OK);
        assert!(!Device::global().contains(h));

        // Releasing a destroyed handle is reported, not undefined.
        assert_eq!(
            ffi::rt_dec_ref(h, &mut err),
            ffi::RT_ERR_UNKNOWN_HANDLE
        );
        assert!(ffi::error_from_rt(&mut err).is_unknown_handle());
    }
}

#[test]
fn test_invalid_arguments() {
    unsafe {
        let mut err = RtError::default();
        let mut handle = RTHandle::invalid();

        let code = ffi::rt_new_handle(std::ptr::null(), &mut handle, &mut err);
        assert_eq!(code, ffi::RT_ERR_INVALID_ARGUMENT);
        assert!(!handle.is_valid());
        match ffi::error_from_rt(&mut err) {
            Error::InvalidArgument(msg) => assert_eq!(msg, "kind is null"),
            other => panic!("expected InvalidArgument, got {:?}", other),
        }

        let kind = CString::new("ffi-not-registered").unwrap();
        let code = ffi::rt_new_handle(kind.as_ptr(), &mut handle, &mut err);
        assert_eq!(code, ffi::RT_ERR_UNKNOWN_KIND);
        match ffi::error_from_rt(&mut err) {
            Error::UnknownKind(kind) => assert_eq!(kind, "ffi-not-registered"),
            other => panic!("expected UnknownKind, got {:?}", other),
        }

        let code = ffi::rt_set_float1(RTHandle::invalid(), std::ptr::null(), 1.0, &mut err);
        assert_eq!(code, ffi::RT_ERR_INVALID_ARGUMENT);
        ffi::rt_error_free(&mut err);

        let prop = CString::new("fov").unwrap();
        let code = ffi::rt_set_float1(RTHandle::invalid(), prop.as_ptr(), 1.0, &mut err);
        assert_eq!(code, ffi::RT_ERR_UNKNOWN_HANDLE);
        ffi::rt_error_free(&mut err);
        assert!(err.message.is_null());
    }
}
