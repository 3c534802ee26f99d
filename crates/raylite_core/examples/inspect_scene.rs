//! Example: Load and inspect a JSON scene description.
//!
//! Run with: cargo run --example inspect_scene -- scenes/demo.json

use std::env;

use raylite_core::{load_scene_file, ShapeDesc};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_scene <path-to-scene.json>");
        return;
    }

    let path = &args[1];
    println!("Loading scene file: {}", path);

    match load_scene_file(path) {
        Ok(desc) => {
            println!("\n=== Scene: {} ===", desc.name);
            println!(
                "Camera: {}x{} @ {:.1} deg, {:?} -> {:?}",
                desc.camera.width, desc.camera.height, desc.camera.fov, desc.camera.position, desc.camera.look_at
            );
            println!("Lights: {}", desc.lights.len() + 1);
            println!("Materials: {}", desc.materials.len());

            println!("\n--- Objects ---");
            for (i, object) in desc.objects.iter().enumerate() {
                let shape = match &object.shape {
                    ShapeDesc::Cuboid => "cuboid".to_string(),
                    ShapeDesc::Sphere => "sphere".to_string(),
                    ShapeDesc::Quad => "quad".to_string(),
                    ShapeDesc::Triangle { .. } => "triangle".to_string(),
                    ShapeDesc::Mesh { mesh } => match desc.mesh(mesh) {
                        Ok(m) => format!("mesh '{}' ({} triangles)", mesh, m.indices.len() / 3),
                        Err(e) => format!("mesh '{}' ({})", mesh, e),
                    },
                };
                println!(
                    "  [{}] {} {} material={} at {:?}",
                    i, object.name, shape, object.material, object.transform.translation
                );
            }
        }
        Err(e) => {
            eprintln!("Error loading scene: {}", e);
            std::process::exit(1);
        }
    }
}
