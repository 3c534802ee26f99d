//! Unit sphere primitive, centred on the object-space origin.

use raylite_math::{Aabb, Interval, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// Nearest root of the unit sphere inside `ray_t`.
pub(crate) fn intersect(ray: &Ray, ray_t: Interval) -> Option<f32> {
    let oc = -ray.origin;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - 1.0;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }
    Some(root)
}

pub(crate) fn normal(p: Vec3) -> Vec3 {
    p.try_normalize().unwrap_or(Vec3::Y)
}

/// Longitude/latitude mapping.
///
/// u runs around the Y axis starting at -X, v runs from the south pole
/// (v = 0) to the north pole (v = 1).
pub(crate) fn uv(p: Vec3) -> Vec2 {
    let n = normal(p);
    let theta = (-n.y).clamp(-1.0, 1.0).acos();
    let phi = (-n.z).atan2(n.x) + PI;

    Vec2::new(phi / (2.0 * PI), theta / PI)
}

pub(crate) fn bounds() -> Aabb {
    Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
}
