//! Simple ray tracer example.
//!
//! Builds a small scene in code and saves it as PNG.
//!
//! Run with: `cargo run -p raylite_renderer --example simple_render --release`

use raylite_core::{Texture, Transform};
use raylite_renderer::{render, Camera, Color, Light, Material, Object, RenderConfig, Scene, Vec3};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Build the scene
    let start = std::time::Instant::now();
    let scene = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig::default()
        .with_samples(16)
        .with_max_depth(8)
        .with_light_grid(3);

    let image = render(&scene, "simple_render.png", &config)?;
    println!("Saved {}x{} image to simple_render.png", image.width, image.height);
    Ok(())
}

fn build_scene() -> Scene {
    let camera = Camera::new()
        .with_resolution(640, 360)
        .with_position(Vec3::new(0.0, 2.0, 8.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_fov(35.0);

    let light = Light::area(
        Vec3::new(-1.0, 5.0, -1.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Color::ONE,
        1.0,
    );

    let mut builder = Scene::builder(camera, light)
        .with_background(Color::new(0.5, 0.7, 1.0))
        .with_ambient(Color::splat(0.3));
    builder.add_light(Light::point(Vec3::new(-6.0, 6.0, 6.0), Color::new(1.0, 0.9, 0.8), 0.5));

    // Ground
    let mut floor = Material::diffuse(Color::ONE);
    floor.surface_mut().texture = Some(Arc::new(Texture::checker(
        16,
        16,
        Color::splat(0.9),
        Color::splat(0.2),
    )));
    builder.add_object(Object::quad(
        &Transform::default().with_scale(Vec3::new(20.0, 1.0, 20.0)),
        Arc::new(floor),
    ));

    // Three main spheres
    builder.add_object(Object::sphere(
        &Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        Arc::new(Material::refractive(Color::ONE, 1.5, 0.9)),
    ));
    builder.add_object(Object::sphere(
        &Transform::from_translation(Vec3::new(-2.5, 1.0, -1.0)),
        Arc::new(Material::diffuse(Color::new(0.4, 0.2, 0.1))),
    ));
    builder.add_object(Object::sphere(
        &Transform::from_translation(Vec3::new(2.5, 1.0, -1.0)),
        Arc::new(Material::reflective(Color::new(0.7, 0.6, 0.5), 0.8)),
    ));

    builder.build()
}
