//! Built-in scene rendered when no scene file is given.

use raylite_core::{Mesh, Texture, Transform};
use raylite_math::{Color, Vec2, Vec3};
use raylite_renderer::{Camera, Light, Material, Object, SceneBuilder};
use std::sync::Arc;

/// Boxes, a mirror sphere, a glass sphere and a small pyramid mesh on a
/// checkered floor, lit by an area light and a dim fill light.
pub fn demo_scene() -> SceneBuilder {
    let camera = Camera::new()
        .with_resolution(640, 360)
        .with_position(Vec3::new(0.0, 2.5, 9.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_fov(40.0);

    let key = Light::area(
        Vec3::new(-1.0, 6.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Color::new(1.0, 0.95, 0.9),
        1.0,
    );

    let mut builder = SceneBuilder::new(camera, key)
        .with_background(Color::new(0.05, 0.05, 0.08))
        .with_ambient(Color::splat(0.25));
    builder.add_light(Light::point(
        Vec3::new(-6.0, 4.0, 6.0),
        Color::new(0.6, 0.7, 1.0),
        0.4,
    ));

    // Floor
    let mut floor = Material::diffuse(Color::ONE);
    floor.surface_mut().texture = Some(Arc::new(Texture::checker(
        12,
        12,
        Color::splat(0.85),
        Color::splat(0.15),
    )));
    floor.surface_mut().specular = 0.0;
    builder.add_object(Object::quad(
        &Transform::default().with_scale(Vec3::new(24.0, 1.0, 24.0)),
        Arc::new(floor),
    ));

    // Boxes
    let mut crate_box = Material::diffuse(Color::ONE);
    crate_box.surface_mut().texture = Some(Arc::new(Texture::box_pattern([
        Color::new(0.8, 0.5, 0.2),
        Color::new(0.4, 0.2, 0.1),
        Color::new(0.4, 0.2, 0.1),
        Color::new(0.4, 0.2, 0.1),
        Color::new(0.4, 0.2, 0.1),
    ])));
    let crate_box = Arc::new(crate_box);
    builder.add_object(Object::cuboid(
        &Transform::from_euler_degrees(
            Vec3::new(-3.2, 0.75, -0.5),
            Vec3::new(0.0, 25.0, 0.0),
            Vec3::splat(1.5),
        ),
        Arc::clone(&crate_box),
    ));
    builder.add_object(Object::cuboid(
        &Transform::from_euler_degrees(
            Vec3::new(-2.9, 1.85, -0.4),
            Vec3::new(0.0, -10.0, 0.0),
            Vec3::splat(0.7),
        ),
        crate_box,
    ));

    // Mirror and glass spheres
    builder.add_object(Object::sphere(
        &Transform::from_translation(Vec3::new(0.0, 1.2, -1.5)).with_scale(Vec3::splat(1.2)),
        Arc::new(Material::reflective(Color::splat(0.9), 0.85)),
    ));
    let mut glass = Material::refractive(Color::ONE, 1.5, 0.95);
    glass.surface_mut().diffuse = 0.1;
    glass.surface_mut().specular = 0.6;
    glass.surface_mut().shininess = 128.0;
    builder.add_object(Object::sphere(
        &Transform::from_translation(Vec3::new(1.8, 0.8, 1.5)).with_scale(Vec3::splat(0.8)),
        Arc::new(glass),
    ));

    // Pyramid mesh
    let pyramid = pyramid_mesh();
    builder.add_mesh(
        &pyramid,
        &Transform::from_euler_degrees(
            Vec3::new(3.6, 0.0, -0.8),
            Vec3::new(0.0, 30.0, 0.0),
            Vec3::new(1.4, 1.8, 1.4),
        ),
        Arc::new(Material::diffuse(Color::new(0.2, 0.5, 0.8))),
    );

    builder
}

/// Square pyramid with its base on y = 0, apex at y = 1.
fn pyramid_mesh() -> Mesh {
    let positions = vec![
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(0.5, 0.0, -0.5),
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(-0.5, 0.0, 0.5),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.5, 0.5),
    ];
    // Sides wound counter-clockwise seen from outside, base facing down
    let indices = vec![
        0, 4, 1, //
        1, 4, 2, //
        2, 4, 3, //
        3, 4, 0, //
        0, 1, 2, //
        0, 2, 3,
    ];
    Mesh::with_uvs(positions, indices, Some(uvs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_contents() {
        let scene = demo_scene().build();
        // floor + 2 boxes + 2 spheres + 6 pyramid faces
        assert_eq!(scene.objects().len(), 11);
        assert_eq!(scene.lights().count(), 2);
    }

    #[test]
    fn test_pyramid_faces_point_outward() {
        let mesh = pyramid_mesh();
        let center = Vec3::new(0.0, 0.3, 0.0);
        for face in mesh.triangles() {
            let [a, b, c] = face.positions;
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid - center) > 0.0, "{face:?}");
        }
    }
}
