//! Basic example demonstrating the handle lifecycle.
//!
//! Run with: cargo run --example spheres

use std::sync::Arc;

use rthandle::{Construct, ConstructError, Device, DeviceOptions, Parms, ViaConstructor};

struct Sphere {
    center: [f32; 3],
    radius: f32,
}

impl Construct for Sphere {
    fn construct(parms: &Parms) -> Result<Self, ConstructError> {
        let radius = parms.get_float("radius", 1.0);
        if radius <= 0.0 {
            return Err(format!("radius must be positive, got {}", radius).into());
        }
        Ok(Sphere {
            center: parms.get_float3("center", [0.0; 3]),
            radius,
        })
    }
}

fn main() -> rthandle::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let device = Device::new(Some(DeviceOptions {
        name: "demo".to_string(),
        handle_limit: Some(16),
    }));
    device.register::<ViaConstructor<Sphere>>("sphere");

    println!("API Version: {}", rthandle::api_version());

    println!("\n--- Creating sphere ---");
    let sphere = device.new_named("sphere")?;
    device.set(sphere, "center", [0.0f32, 1.0, 0.0])?;
    device.set(sphere, "radius", 2.0f32)?;
    device.commit(sphere)?;

    let s = device.cast_handle::<Sphere>(sphere, "sphere")?;
    println!("center={:?} radius={}", s.center, s.radius);

    println!("\n--- Rejected parameters ---");
    device.set(sphere, "radius", -1.0f32)?;
    match device.commit(sphere) {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("commit failed: {}", e),
    }
    let s = device.cast_handle::<Sphere>(sphere, "sphere")?;
    println!("still live: radius={}", s.radius);

    println!("\n--- Constant handle ---");
    let unit = device.new_constant(Arc::new(Sphere {
        center: [0.0; 3],
        radius: 1.0,
    }))?;
    if let Err(e) = device.set(unit, "radius", 3.0f32) {
        println!("set on constant handle: {}", e);
    }
    let u = device.cast_handle::<Sphere>(unit, "sphere")?;
    println!("unit radius={}", u.radius);

    println!("\n--- Releasing ---");
    device.dec_ref(sphere)?;
    device.dec_ref(unit)?;
    println!("live handles: {}", device.len());

    Ok(())
}
