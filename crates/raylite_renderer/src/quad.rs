//! Unit square in the object-space XZ plane, facing +Y.
//!
//! Scaled and rotated by the object transform this gives floors, walls and
//! any other finite plane.

use raylite_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Rays closer to parallel than this are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-8;

pub(crate) fn intersect(ray: &Ray, ray_t: Interval) -> Option<f32> {
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = -ray.origin.y / ray.direction.y;
    if !ray_t.surrounds(t) {
        return None;
    }

    let p = ray.at(t);
    if p.x.abs() > 0.5 || p.z.abs() > 0.5 {
        return None;
    }
    Some(t)
}

pub(crate) fn normal() -> Vec3 {
    Vec3::Y
}

pub(crate) fn uv(p: Vec3) -> Vec2 {
    Vec2::new(p.x + 0.5, p.z + 0.5).clamp(Vec2::ZERO, Vec2::ONE)
}

pub(crate) fn bounds() -> Aabb {
    Aabb::from_points(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 0.0, 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_hit_from_above_and_below() {
        let down = Ray::new(Vec3::new(0.1, 2.0, 0.2), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(intersect(&down, Interval::new(1e-4, f32::INFINITY)), Some(2.0));

        let up = Ray::new(Vec3::new(0.1, -3.0, 0.2), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(intersect(&up, Interval::new(1e-4, f32::INFINITY)), Some(3.0));
    }

    #[test]
    fn test_quad_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::X);
        assert!(intersect(&ray, Interval::new(1e-4, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_quad_outside_extent_misses() {
        let ray = Ray::new(Vec3::new(0.6, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(intersect(&ray, Interval::new(1e-4, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_quad_uv_corners() {
        assert_eq!(uv(Vec3::new(-0.5, 0.0, -0.5)), Vec2::ZERO);
        assert_eq!(uv(Vec3::new(0.5, 0.0, 0.5)), Vec2::ONE);
        assert_eq!(uv(Vec3::ZERO), Vec2::splat(0.5));
    }
}
