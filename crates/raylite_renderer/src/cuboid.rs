//! Unit cube primitive spanning [-0.5, 0.5] on every object-space axis.

use raylite_math::{Aabb, Interval, Ray, Vec2, Vec3};

const HALF: f32 = 0.5;

/// Slab test against the unit cube. From outside the entry face is
/// returned, from inside the exit face.
pub(crate) fn intersect(ray: &Ray, ray_t: Interval) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d == 0.0 {
            // Parallel to this slab pair: inside or a clean miss
            if o.abs() > HALF {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (-HALF - o) * inv;
        let mut t1 = (HALF - o) * inv;
        if inv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_far < t_near {
            return None;
        }
    }

    [t_near, t_far].into_iter().find(|&t| ray_t.surrounds(t))
}

/// Index and sign of the face a surface point lies on.
fn face(p: Vec3) -> (usize, f32) {
    let a = p.abs();
    let axis = if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    };
    (axis, if p[axis] >= 0.0 { 1.0 } else { -1.0 })
}

pub(crate) fn normal(p: Vec3) -> Vec3 {
    let (axis, sign) = face(p);
    let mut n = Vec3::ZERO;
    n[axis] = sign;
    n
}

/// Planar projection of the face the point lies on. Each face covers the
/// full [0,1] square, oriented so it reads upright from outside the cube.
pub(crate) fn uv(p: Vec3) -> Vec2 {
    let (axis, sign) = face(p);
    let uv = match axis {
        0 => Vec2::new(HALF - sign * p.z, p.y + HALF),
        1 => Vec2::new(p.x + HALF, HALF - sign * p.z),
        _ => Vec2::new(p.x * sign + HALF, p.y + HALF),
    };
    uv.clamp(Vec2::ZERO, Vec2::ONE)
}

pub(crate) fn bounds() -> Aabb {
    Aabb::from_points(Vec3::splat(-HALF), Vec3::splat(HALF))
}
