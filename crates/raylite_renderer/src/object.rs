//! Placed scene objects and the records their intersections produce.
//!
//! An [`Object`] pairs a primitive [`Shape`] with a material and an
//! object-to-world transform. Rays are carried into object space with the
//! inverse transform and intersected against the canonical primitive; the
//! direction is not renormalized there, so the parameter found in object
//! space is the world-space parameter too.

use crate::material::Material;
use crate::triangle::Triangle;
use crate::{cuboid, quad, sphere};
use raylite_core::{Mesh, Transform};
use raylite_math::{Aabb, Interval, Mat3, Mat4, Mat4Ext, Ray, Vec2, Vec3};
use std::sync::Arc;

/// Smallest accepted hit distance. Rays leaving a surface must not find it
/// again at t = 0.
pub const RAY_EPSILON: f32 = 1e-4;

/// Canonical primitives, each defined in its own object space.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Unit cube spanning [-0.5, 0.5] on every axis
    Cuboid,
    /// Unit-radius sphere centred on the origin
    Sphere,
    /// Unit square in the XZ plane facing +Y
    Quad,
    Triangle(Triangle),
}

impl Shape {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        match self {
            Shape::Cuboid => cuboid::intersect(ray, ray_t),
            Shape::Sphere => sphere::intersect(ray, ray_t),
            Shape::Quad => quad::intersect(ray, ray_t),
            Shape::Triangle(tri) => tri.intersect(ray, ray_t),
        }
    }

    fn normal(&self, p: Vec3) -> Vec3 {
        match self {
            Shape::Cuboid => cuboid::normal(p),
            Shape::Sphere => sphere::normal(p),
            Shape::Quad => quad::normal(),
            Shape::Triangle(tri) => tri.normal(),
        }
    }

    fn uv(&self, p: Vec3) -> Vec2 {
        match self {
            Shape::Cuboid => cuboid::uv(p),
            Shape::Sphere => sphere::uv(p),
            Shape::Quad => quad::uv(p),
            Shape::Triangle(tri) => tri.uv(p),
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            Shape::Cuboid => cuboid::bounds(),
            Shape::Sphere => sphere::bounds(),
            Shape::Quad => quad::bounds(),
            Shape::Triangle(tri) => tri.bounds(),
        }
    }
}

/// A shape placed in the world with a material.
#[derive(Debug, Clone)]
pub struct Object {
    shape: Shape,
    material: Arc<Material>,
    object_to_world: Mat4,
    world_to_object: Mat4,
    normal_matrix: Mat3,
    /// World-space bounds
    bbox: Aabb,
}

impl Object {
    /// Place a shape with an explicit object-to-world matrix.
    ///
    /// A singular matrix yields an object that is never hit and has empty
    /// bounds.
    pub fn new(shape: Shape, object_to_world: Mat4, material: Arc<Material>) -> Self {
        let det = object_to_world.determinant();
        let invertible = det != 0.0 && det.is_finite();

        let (world_to_object, normal_matrix, bbox) = if invertible {
            let local = shape.bounds();
            let world = object_to_world.transform_aabb(&local);
            (object_to_world.inverse(), object_to_world.normal_matrix(), pad(world))
        } else {
            (Mat4::ZERO, Mat3::ZERO, Aabb::EMPTY)
        };

        Self {
            shape,
            material,
            object_to_world,
            world_to_object,
            normal_matrix,
            bbox,
        }
    }

    pub fn with_transform(shape: Shape, transform: &Transform, material: Arc<Material>) -> Self {
        Self::new(shape, transform.to_matrix(), material)
    }

    pub fn cuboid(transform: &Transform, material: Arc<Material>) -> Self {
        Self::with_transform(Shape::Cuboid, transform, material)
    }

    pub fn sphere(transform: &Transform, material: Arc<Material>) -> Self {
        Self::with_transform(Shape::Sphere, transform, material)
    }

    pub fn quad(transform: &Transform, material: Arc<Material>) -> Self {
        Self::with_transform(Shape::Quad, transform, material)
    }

    pub fn triangle(triangle: Triangle, transform: &Transform, material: Arc<Material>) -> Self {
        Self::with_transform(Shape::Triangle(triangle), transform, material)
    }

    /// Expand a mesh into one triangle object per face, all sharing the
    /// material. Degenerate faces are dropped.
    pub fn mesh(mesh: &Mesh, transform: &Transform, material: Arc<Material>) -> Vec<Self> {
        let matrix = transform.to_matrix();
        let mut skipped = 0usize;
        let objects: Vec<Self> = mesh
            .triangles()
            .into_iter()
            .filter_map(|face| {
                let [a, b, c] = face.positions;
                let mut tri = Triangle::new(a, b, c);
                if tri.is_degenerate() {
                    skipped += 1;
                    return None;
                }
                if let Some(uvs) = face.uvs {
                    tri = tri.with_uvs(uvs);
                }
                Some(Self::new(Shape::Triangle(tri), matrix, Arc::clone(&material)))
            })
            .collect();

        if skipped > 0 {
            log::debug!("Dropped {} degenerate mesh triangles", skipped);
        }
        objects
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn object_to_world(&self) -> Mat4 {
        self.object_to_world
    }

    pub fn world_to_object(&self) -> Mat4 {
        self.world_to_object
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// False when the transform collapsed the object (zero scale).
    pub fn is_renderable(&self) -> bool {
        !self.bbox.is_empty()
    }

    /// Nearest world-space hit distance greater than [`RAY_EPSILON`].
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.intersect_within(ray, Interval::new(RAY_EPSILON, f32::INFINITY))
    }

    /// Nearest hit distance strictly inside `ray_t`.
    pub fn intersect_within(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        if !self.is_renderable() {
            return None;
        }
        let local = Ray::new(
            self.world_to_object.transform_point3(ray.origin),
            self.world_to_object.transform_vector3(ray.direction),
        );
        self.shape.intersect(&local, ray_t)
    }

    /// Outward unit normal at a world-space point on the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        let local = self.world_to_object.transform_point3(point);
        let n = self.shape.normal(local);
        (self.normal_matrix * n).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Texture coordinate of a world-space point on the surface.
    pub fn map_texture(&self, point: Vec3) -> Vec2 {
        let local = self.world_to_object.transform_point3(point);
        self.shape.uv(local)
    }

    /// Full hit record for the nearest hit inside `ray_t`.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let t = self.intersect_within(ray, ray_t)?;
        Some(HitRecord::new(ray, t, self))
    }
}

/// Grow world bounds slightly so surface points computed in object space
/// never fall outside them through rounding.
fn pad(bbox: Aabb) -> Aabb {
    let extent = (bbox.max_corner() - bbox.min_corner()).max_element();
    let delta = 1e-4 + extent * 1e-5;
    Aabb::new(
        bbox.x.expand(delta),
        bbox.y.expand(delta),
        bbox.z.expand(delta),
    )
}

/// Record of a ray-object intersection.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// UV texture coordinates
    pub uv: Vec2,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    pub object: &'a Object,
}

impl<'a> HitRecord<'a> {
    pub fn new(ray: &Ray, t: f32, object: &'a Object) -> Self {
        let p = ray.at(t);
        let mut rec = Self {
            p,
            normal: Vec3::ZERO,
            uv: object.map_texture(p),
            t,
            front_face: true,
            object,
        };
        rec.set_face_normal(ray, object.normal_at(p));
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction, and
    /// `front_face` records whether the ray arrived from outside.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    pub fn material(&self) -> &'a Material {
        self.object.material()
    }
}
