//! Surface materials for Whitted-style shading.
//!
//! Every material carries a Phong [`Surface`]; reflective and refractive
//! materials add the parameters for their secondary rays.

use raylite_core::{MaterialDesc, MaterialKind, Texture};
use raylite_math::{Color, Vec2, Vec3};
use std::sync::Arc;

/// Phong surface parameters shared by every material kind.
#[derive(Debug, Clone)]
pub struct Surface {
    /// Base color, used when no texture is attached
    pub color: Color,
    pub texture: Option<Arc<Texture>>,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Surface {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            texture: None,
            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.2,
            shininess: 32.0,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_coefficients(mut self, ambient: f32, diffuse: f32, specular: f32) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Base color at a texture coordinate.
    pub fn color_at(&self, uv: Vec2) -> Color {
        match &self.texture {
            Some(texture) => texture.color_at(uv),
            None => self.color,
        }
    }

    /// Diffuse plus specular response to one unit of light arriving along
    /// `to_light`, seen from `to_eye`. All vectors are unit length and
    /// `normal` faces the viewer.
    pub fn phong(&self, normal: Vec3, to_light: Vec3, to_eye: Vec3, base: Color) -> Color {
        let n_dot_l = normal.dot(to_light).max(0.0);
        let diffuse = base * (self.diffuse * n_dot_l);

        let r = reflect(-to_light, normal);
        let r_dot_v = r.dot(to_eye).max(0.0);
        let specular = if self.specular > 0.0 && r_dot_v > 0.0 {
            self.specular * r_dot_v.powf(self.shininess)
        } else {
            0.0
        };

        diffuse + Color::splat(specular)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Color::splat(0.8))
    }
}

/// Material variants. Dispatch is a `match`, the set is closed.
#[derive(Debug, Clone)]
pub enum Material {
    Diffuse(Surface),
    /// Mirror-like; `reflectivity` in [0,1] blends the local Phong term
    /// with the reflected ray.
    Reflective { surface: Surface, reflectivity: f32 },
    /// Glass-like; `transparency` in [0,1] blends the local Phong term
    /// with the Fresnel-weighted reflected and refracted rays.
    Refractive {
        surface: Surface,
        ior: f32,
        transparency: f32,
    },
}

impl Material {
    pub fn diffuse(color: Color) -> Self {
        Material::Diffuse(Surface::new(color))
    }

    pub fn reflective(color: Color, reflectivity: f32) -> Self {
        Material::Reflective {
            surface: Surface::new(color),
            reflectivity: reflectivity.clamp(0.0, 1.0),
        }
    }

    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn refractive(color: Color, ior: f32, transparency: f32) -> Self {
        Material::Refractive {
            surface: Surface::new(color),
            ior,
            transparency: transparency.clamp(0.0, 1.0),
        }
    }

    /// Build from a scene description record. The texture, if any, has
    /// already been resolved by the caller.
    pub fn from_desc(desc: &MaterialDesc, texture: Option<Arc<Texture>>) -> Self {
        let surface = Surface {
            color: desc.color,
            texture,
            ambient: desc.ambient,
            diffuse: desc.diffuse,
            specular: desc.specular,
            shininess: desc.shininess,
        };
        match desc.kind {
            MaterialKind::Diffuse => Material::Diffuse(surface),
            MaterialKind::Reflective => Material::Reflective {
                surface,
                reflectivity: desc.reflectivity.clamp(0.0, 1.0),
            },
            MaterialKind::Refractive => Material::Refractive {
                surface,
                ior: desc.ior,
                transparency: desc.transparency.clamp(0.0, 1.0),
            },
        }
    }

    pub fn surface(&self) -> &Surface {
        match self {
            Material::Diffuse(surface)
            | Material::Reflective { surface, .. }
            | Material::Refractive { surface, .. } => surface,
        }
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        match self {
            Material::Diffuse(surface)
            | Material::Reflective { surface, .. }
            | Material::Refractive { surface, .. } => surface,
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal: `d - 2(d.n)n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces against it.
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Option<Vec3> {
    let cos_i = (-uv).dot(n).min(1.0);
    let sin2_t = etai_over_etat * etai_over_etat * (1.0 - cos_i * cos_i).max(0.0);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(etai_over_etat * uv + (etai_over_etat * cos_i - cos_t) * n)
}

/// Schlick's approximation for reflectance
#[inline]
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine.clamp(0.0, 1.0)).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_preserves_angle() {
        let n = Vec3::Y;
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, n);

        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
        assert!((r.length() - 1.0).abs() < 1e-6);
        // Angle of incidence equals angle of reflection
        assert!(((-d).dot(n) - r.dot(n)).abs() < 1e-6);
    }

    #[test]
    fn test_refract_straight_through() {
        let d = -Vec3::Y;
        let t = refract(d, Vec3::Y, 1.0 / 1.5).unwrap();
        assert!((t - d).length() < 1e-6);
    }

    #[test]
    fn test_refract_bends_towards_normal() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let eta = 1.0 / 1.5;
        let t = refract(d, Vec3::Y, eta).unwrap();

        assert!((t.length() - 1.0).abs() < 1e-5);
        // Snell: sin_t = eta * sin_i
        let sin_i = d.x;
        assert!((t.x - eta * sin_i).abs() < 1e-5);
        assert!(t.y < 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at a grazing angle
        let d = Vec3::new(0.9, -0.1, 0.0).normalize();
        assert!(refract(d, Vec3::Y, 1.5).is_none());
    }

    #[test]
    fn test_reflectance_grows_at_grazing_angles() {
        let head_on = reflectance(1.0, 1.0 / 1.5);
        let grazing = reflectance(0.05, 1.0 / 1.5);
        assert!((head_on - 0.04).abs() < 1e-3);
        assert!(grazing > 0.7);
    }

    #[test]
    fn test_phong_terms() {
        let surface = Surface::new(Color::ONE).with_coefficients(0.0, 1.0, 0.0);
        let lit = surface.phong(Vec3::Y, Vec3::Y, Vec3::Y, Color::ONE);
        assert!((lit - Color::ONE).length() < 1e-6);

        // Light behind the surface contributes nothing
        let unlit = surface.phong(Vec3::Y, -Vec3::Y, Vec3::Y, Color::ONE);
        assert_eq!(unlit, Color::ZERO);

        // Specular highlight when the eye sits on the mirror direction
        let shiny = Surface::new(Color::ZERO).with_coefficients(0.0, 0.0, 1.0);
        let l = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let v = Vec3::new(1.0, 1.0, 0.0).normalize();
        let highlight = shiny.phong(Vec3::Y, l, v, Color::ZERO);
        assert!((highlight - Color::ONE).length() < 1e-5);
    }

    #[test]
    fn test_from_desc_kinds() {
        let mut desc = MaterialDesc::default();
        assert!(matches!(Material::from_desc(&desc, None), Material::Diffuse(_)));

        desc.kind = MaterialKind::Refractive;
        desc.transparency = 3.0;
        match Material::from_desc(&desc, None) {
            Material::Refractive { ior, transparency, .. } => {
                assert_eq!(ior, 1.5);
                assert_eq!(transparency, 1.0);
            }
            other => panic!("expected refractive, got {other:?}"),
        }
    }

    #[test]
    fn test_textured_surface_color() {
        let texture = Arc::new(Texture::checker(2, 2, Color::ONE, Color::ZERO));
        let surface = Surface::new(Color::splat(0.5)).with_texture(texture);
        assert_eq!(surface.color_at(Vec2::new(0.1, 0.1)), Color::ONE);
        assert_eq!(surface.color_at(Vec2::new(0.6, 0.1)), Color::ZERO);
    }
}
