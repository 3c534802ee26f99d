//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Vertices live in object space; meshes are expanded into one triangle
//! object per face.

use raylite_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Below this sine of the angle between the ray and the triangle's plane
/// the ray counts as parallel and cannot hit it.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A triangle with optional per-vertex texture coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    uvs: Option<[Vec2; 3]>,
    /// Pre-computed face normal (unit length, zero when degenerate)
    normal: Vec3,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The face normal follows the winding `(v1 - v0) x (v2 - v0)`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            v0,
            v1,
            v2,
            uvs: None,
            normal,
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn uvs(&self) -> Option<[Vec2; 3]> {
        self.uvs
    }

    /// Face normal. Zero for a degenerate (zero-area) triangle.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// True when the vertices are collinear or coincident.
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    /// Möller-Trumbore ray-triangle intersection.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // `a` scales with the edge lengths and the (unnormalized) direction,
        // so the parallel test is relative to them
        let scale = edge1.length() * edge2.length() * ray.direction.length();
        if a.abs() <= PARALLEL_EPSILON * scale || !a.is_finite() {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        ray_t.surrounds(t).then_some(t)
    }

    /// Barycentric coordinates `(alpha, beta, gamma)` of `p` relative to
    /// `(v0, v1, v2)`.
    ///
    /// `p` is projected onto the triangle's plane first, and the result is
    /// clamped into the triangle so that `beta >= 0`, `gamma >= 0` and
    /// `beta + gamma <= 1` hold even for points slightly outside it.
    pub fn barycentric(&self, p: Vec3) -> (f32, f32, f32) {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let d = p - self.v0;

        let d00 = e1.dot(e1);
        let d01 = e1.dot(e2);
        let d11 = e2.dot(e2);
        let d20 = d.dot(e1);
        let d21 = d.dot(e2);

        let denom = d00 * d11 - d01 * d01;
        if denom.abs() <= f32::EPSILON * d00 * d11 {
            return (1.0, 0.0, 0.0);
        }

        let mut beta = ((d11 * d20 - d01 * d21) / denom).max(0.0);
        let mut gamma = ((d00 * d21 - d01 * d20) / denom).max(0.0);
        if !beta.is_finite() || !gamma.is_finite() {
            return (1.0, 0.0, 0.0);
        }

        let sum = beta + gamma;
        if sum > 1.0 {
            beta /= sum;
            gamma /= sum;
        }
        let beta = beta.min(1.0);
        let gamma = gamma.min(1.0 - beta);

        (1.0 - beta - gamma, beta, gamma)
    }

    /// Texture coordinate at `p`: interpolated vertex UVs when present,
    /// otherwise `(beta, gamma)`.
    pub fn uv(&self, p: Vec3) -> Vec2 {
        let (alpha, beta, gamma) = self.barycentric(p);
        match self.uvs {
            Some([uv0, uv1, uv2]) => uv0 * alpha + uv1 * beta + uv2 * gamma,
            None => Vec2::new(beta, gamma),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_point_cloud([self.v0, self.v1, self.v2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn xy_triangle() -> Triangle {
        // Triangle in XY plane at z=-1
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let t = xy_triangle().intersect(&ray, Interval::new(0.001, f32::INFINITY));
        assert!((t.unwrap() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_miss() {
        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(xy_triangle()
            .intersect(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());

        // Ray passing beside it
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(xy_triangle()
            .intersect(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_tiny_triangle_is_hit() {
        let h = 5e-5;
        let tri = Triangle::new(
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, -h, 0.0),
            Vec3::new(0.0, h, 0.0),
        );
        assert!(!tri.is_degenerate());

        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let t = tri.intersect(&ray, Interval::new(1e-4, f32::INFINITY));
        assert!((t.unwrap() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_short_direction_still_hits() {
        // Object-space directions shrink under large scale transforms
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1e-6));
        let t = xy_triangle().intersect(&ray, Interval::new(1e-4, f32::INFINITY));
        assert!((t.unwrap() / 1e6 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_grazing_ray_misses() {
        let ray = Ray::new(Vec3::new(-2.0, 0.0, -1.0), Vec3::X);
        assert!(xy_triangle()
            .intersect(&ray, Interval::new(1e-4, f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_triangle_normal_follows_winding() {
        assert!((xy_triangle().normal() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(tri.is_degenerate());

        for dir in [Vec3::Z, -Vec3::Z, Vec3::Y, -Vec3::Y, Vec3::X] {
            let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0) - dir, dir);
            assert!(tri.intersect(&ray, Interval::new(1e-4, f32::INFINITY)).is_none());
        }
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let tri = xy_triangle();
        let [v0, v1, v2] = tri.vertices();

        let (a, b, c) = tri.barycentric(v0);
        assert!((a - 1.0).abs() < 1e-5 && b.abs() < 1e-5 && c.abs() < 1e-5);
        let (a, b, c) = tri.barycentric(v1);
        assert!(a.abs() < 1e-5 && (b - 1.0).abs() < 1e-5 && c.abs() < 1e-5);
        let (a, b, c) = tri.barycentric(v2);
        assert!(a.abs() < 1e-5 && b.abs() < 1e-5 && (c - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_barycentric_bounds_hold_for_random_points() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut random_vec = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            )
        };

        for _ in 0..500 {
            let tri = Triangle::new(random_vec(&mut rng), random_vec(&mut rng), random_vec(&mut rng));
            // Arbitrary points, inside, outside and off the plane
            let p = random_vec(&mut rng);
            let (alpha, beta, gamma) = tri.barycentric(p);

            assert!(beta >= 0.0, "beta {beta}");
            assert!(gamma >= 0.0, "gamma {gamma}");
            assert!(beta + gamma <= 1.0, "beta + gamma = {}", beta + gamma);
            assert!((alpha + beta + gamma - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_barycentric_recovers_interior_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.5, 0.0),
            Vec3::new(1.0, 3.0, 1.0),
        );
        let [v0, v1, v2] = tri.vertices();

        for _ in 0..200 {
            let b: f32 = rng.gen_range(0.0..1.0);
            let c: f32 = rng.gen_range(0.0..(1.0 - b));
            let a = 1.0 - b - c;
            let p = v0 * a + v1 * b + v2 * c;

            let (alpha, beta, gamma) = tri.barycentric(p);
            assert!((alpha - a).abs() < 1e-3);
            assert!((beta - b).abs() < 1e-3);
            assert!((gamma - c).abs() < 1e-3);
        }
    }

    #[test]
    fn test_uv_interpolation() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y).with_uvs([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        let uv = tri.uv(Vec3::new(0.25, 0.5, 0.0));
        assert!((uv - Vec2::new(0.25, 0.5)).length() < 1e-5);

        // Without UVs the barycentric pair is used directly
        let plain = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        let uv = plain.uv(Vec3::new(0.25, 0.5, 0.0));
        assert!((uv - Vec2::new(0.25, 0.5)).length() < 1e-5);
    }
}
